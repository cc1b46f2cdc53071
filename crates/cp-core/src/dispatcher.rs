//! Allocation engine.
//!
//! The [`Dispatcher`] owns the fleet, the group registry and the journey
//! ledger, and is the only thing allowed to mutate them together.
//!
//! # Matching policy
//!
//! Exact-capacity, first-available: a request for N seats gets the first
//! vehicle in load order whose capacity is exactly N and which is not
//! engaged. If there is none the journey is still recorded, without a
//! vehicle, and is never re-matched later.
//!
//! # Engagement invariant
//!
//! A vehicle is engaged if and only if exactly one active journey references
//! it. [`Dispatcher::verify`] checks this; every mutating operation asserts it
//! in debug builds.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DispatchError;
use crate::fleet::{Fleet, Vehicle, VehicleSpec};
use crate::groups::GroupRegistry;
use crate::journeys::{Assignment, Journey, JourneyLedger};
use crate::types::{GroupId, JourneyId, Seats, VehicleId};

/// Result of a successful journey request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyStarted {
    pub journey: JourneyId,
    pub assignment: Assignment,
}

/// Point-in-time counters and active journeys for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub vehicles: usize,
    pub engaged_vehicles: usize,
    pub groups: usize,
    pub journeys: usize,
    pub waiting_journeys: usize,
    pub fleet_loaded_at: Option<DateTime<Utc>>,
    /// Active journeys ordered by group, waiting ones included.
    pub active_journeys: Vec<Journey>,
}

/// The allocation engine and the state it manages.
///
/// Not synchronized on its own; see [`crate::SharedDispatcher`].
#[derive(Debug, Default)]
pub struct Dispatcher {
    fleet: Fleet,
    groups: GroupRegistry,
    journeys: JourneyLedger,
    fleet_loaded_at: Option<DateTime<Utc>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher with `specs` already loaded.
    pub fn with_fleet(specs: &[VehicleSpec]) -> Result<Self, DispatchError> {
        let mut dispatcher = Self::new();
        dispatcher.load_fleet(specs)?;
        Ok(dispatcher)
    }

    /// Replaces the fleet and discards every active journey.
    ///
    /// Registered groups survive a reload but lose their journeys. Group and
    /// journey identities are not reset.
    pub fn load_fleet(&mut self, specs: &[VehicleSpec]) -> Result<usize, DispatchError> {
        let loaded = self.fleet.load(specs)?;
        let discarded = self.journeys.len();
        self.journeys.clear();
        self.fleet_loaded_at = Some(Utc::now());

        tracing::info!(vehicles = loaded, discarded, "fleet loaded");
        self.debug_verify();
        Ok(loaded)
    }

    pub fn register_group(&mut self) -> GroupId {
        let id = self.groups.register();
        tracing::debug!(group = %id, "group registered");
        id
    }

    /// Starts a journey for `group`, binding a vehicle if one is free.
    ///
    /// Finding the vehicle, recording the journey and engaging the vehicle
    /// form one critical section: callers sharing a dispatcher must hold an
    /// exclusive lock across this call, or two requests for the same seat
    /// count could both be handed the same vehicle.
    pub fn start_journey(
        &mut self,
        group: GroupId,
        seats: Seats,
    ) -> Result<JourneyStarted, DispatchError> {
        if !self.groups.exists(group) {
            return Err(DispatchError::GroupNotFound(group));
        }
        if let Some(active) = self.journeys.find_by_group(group) {
            return Err(DispatchError::JourneyAlreadyActive {
                group,
                journey: active.id,
            });
        }

        let vehicle = self.fleet.find_free_by_seats(seats).map(Vehicle::id);
        let journey = self.journeys.open(group, vehicle, seats);
        if let Some(vehicle) = vehicle {
            self.fleet.set_engaged(vehicle, true);
        }

        let assignment = vehicle.map_or(Assignment::Waiting, Assignment::Assigned);
        match assignment {
            Assignment::Assigned(vehicle) => {
                tracing::debug!(%group, %journey, %seats, %vehicle, "journey assigned");
            }
            Assignment::Waiting => {
                tracing::debug!(%group, %journey, %seats, "no vehicle available");
            }
        }

        self.debug_verify();
        Ok(JourneyStarted {
            journey,
            assignment,
        })
    }

    /// Returns the vehicle the group is travelling in, or `Waiting`.
    pub fn locate(&self, group: GroupId) -> Result<Assignment, DispatchError> {
        if !self.groups.exists(group) {
            return Err(DispatchError::GroupNotFound(group));
        }
        self.journeys
            .find_by_group(group)
            .map(Journey::assignment)
            .ok_or(DispatchError::JourneyNotFound(group))
    }

    /// Ends the group's journey, forgets the group and frees its vehicle.
    pub fn drop_off(&mut self, group: GroupId) -> Result<Journey, DispatchError> {
        if !self.groups.exists(group) {
            return Err(DispatchError::GroupNotFound(group));
        }
        if self.journeys.find_by_group(group).is_none() {
            return Err(DispatchError::JourneyNotFound(group));
        }

        self.groups.remove(group)?;
        let journey = self
            .journeys
            .close(group)
            .ok_or(DispatchError::JourneyNotFound(group))?;

        if let Some(vehicle) = journey.vehicle {
            if !self.fleet.set_engaged(vehicle, false) {
                tracing::warn!(%vehicle, journey = %journey.id, "released vehicle is no longer in the fleet");
            }
        }

        tracing::debug!(%group, journey = %journey.id, "group dropped off");
        self.debug_verify();
        Ok(journey)
    }

    pub const fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub const fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub const fn journeys(&self) -> &JourneyLedger {
        &self.journeys
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            vehicles: self.fleet.len(),
            engaged_vehicles: self.fleet.engaged_count(),
            groups: self.groups.len(),
            journeys: self.journeys.len(),
            waiting_journeys: self.journeys.waiting_count(),
            fleet_loaded_at: self.fleet_loaded_at,
            active_journeys: self.journeys.iter().cloned().collect(),
        }
    }

    /// Checks that engagement flags agree with the journey ledger.
    pub fn verify(&self) -> Result<(), DispatchError> {
        let mut bound: HashMap<VehicleId, JourneyId> = HashMap::new();

        for journey in self.journeys.iter() {
            if !self.groups.exists(journey.group) {
                return Err(DispatchError::Inconsistency(format!(
                    "journey {} belongs to unknown group {}",
                    journey.id, journey.group
                )));
            }

            let Some(vehicle) = journey.vehicle else {
                continue;
            };
            if let Some(other) = bound.insert(vehicle, journey.id) {
                return Err(DispatchError::Inconsistency(format!(
                    "vehicle {vehicle} is bound to journeys {other} and {}",
                    journey.id
                )));
            }
            match self.fleet.find_by_id(vehicle) {
                None => {
                    return Err(DispatchError::Inconsistency(format!(
                        "journey {} references unknown vehicle {vehicle}",
                        journey.id
                    )));
                }
                Some(v) if !v.is_engaged() => {
                    return Err(DispatchError::Inconsistency(format!(
                        "vehicle {vehicle} is bound to journey {} but not engaged",
                        journey.id
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(stray) = self
            .fleet
            .iter()
            .find(|v| v.is_engaged() && !bound.contains_key(&v.id()))
        {
            return Err(DispatchError::Inconsistency(format!(
                "vehicle {} is engaged without a journey",
                stray.id()
            )));
        }

        Ok(())
    }

    fn debug_verify(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.verify() {
                panic!("{err}");
            }
        }
    }
}
