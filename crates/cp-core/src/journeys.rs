//! Journey ledger: which group travels in which vehicle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{GroupId, JourneyId, Seats, VehicleId};

/// Outcome of matching a journey request against the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// The group rides in this vehicle.
    Assigned(VehicleId),
    /// No vehicle of the requested capacity was free. The request is not
    /// retried when one frees up.
    Waiting,
}

impl Assignment {
    pub const fn vehicle(self) -> Option<VehicleId> {
        match self {
            Self::Assigned(id) => Some(id),
            Self::Waiting => None,
        }
    }
}

/// An active journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Journey {
    pub id: JourneyId,
    pub group: GroupId,
    /// `None` when no vehicle was available at request time.
    pub vehicle: Option<VehicleId>,
    pub seats: Seats,
    pub requested_at: DateTime<Utc>,
}

impl Journey {
    pub const fn assignment(&self) -> Assignment {
        match self.vehicle {
            Some(id) => Assignment::Assigned(id),
            None => Assignment::Waiting,
        }
    }
}

/// Active journeys, at most one per group.
///
/// The ledger only records; it does not touch vehicle engagement. Keeping
/// engagement in step is the dispatcher's job.
#[derive(Debug, Default)]
pub struct JourneyLedger {
    by_group: BTreeMap<GroupId, Journey>,
    last_issued: Option<JourneyId>,
}

impl JourneyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new journey and returns its identity.
    ///
    /// The caller must have checked that `group` has no active journey.
    pub fn open(&mut self, group: GroupId, vehicle: Option<VehicleId>, seats: Seats) -> JourneyId {
        debug_assert!(
            !self.by_group.contains_key(&group),
            "group {group} already has an active journey"
        );

        let id = JourneyId::after(self.last_issued);
        self.last_issued = Some(id);
        self.by_group.insert(
            group,
            Journey {
                id,
                group,
                vehicle,
                seats,
                requested_at: Utc::now(),
            },
        );
        id
    }

    pub fn find_by_group(&self, group: GroupId) -> Option<&Journey> {
        self.by_group.get(&group)
    }

    /// Removes and returns the group's journey, if any.
    pub fn close(&mut self, group: GroupId) -> Option<Journey> {
        self.by_group.remove(&group)
    }

    /// Discards every journey. Identities keep counting from where they were.
    pub fn clear(&mut self) {
        self.by_group.clear();
    }

    pub fn len(&self) -> usize {
        self.by_group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_group.is_empty()
    }

    /// Number of journeys that did not get a vehicle.
    pub fn waiting_count(&self) -> usize {
        self.by_group.values().filter(|j| j.vehicle.is_none()).count()
    }

    /// Iterates over journeys ordered by group.
    pub fn iter(&self) -> impl Iterator<Item = &Journey> {
        self.by_group.values()
    }
}
