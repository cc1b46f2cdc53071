//! Fleet registry: the loaded vehicles and their engagement flags.
//!
//! Vehicles keep the order they were loaded in. That order is the tie-break
//! for allocation: among free vehicles of the requested capacity, the one
//! loaded first wins.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Seats, ValidationError, VehicleId};

/// A vehicle as supplied when loading a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub id: VehicleId,
    pub seats: Seats,
}

impl VehicleSpec {
    /// Builds a `VehicleSpec` from raw integers, rejecting zeros.
    pub fn new(id: u64, seats: u32) -> Result<Self, ValidationError> {
        Ok(Self {
            id: VehicleId::new(id)?,
            seats: Seats::new(seats)?,
        })
    }
}

/// A loaded vehicle.
///
/// The engagement flag can only be changed through [`Fleet::set_engaged`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    id: VehicleId,
    seats: Seats,
    engaged: bool,
}

impl Vehicle {
    pub const fn id(&self) -> VehicleId {
        self.id
    }

    pub const fn seats(&self) -> Seats {
        self.seats
    }

    pub const fn is_engaged(&self) -> bool {
        self.engaged
    }
}

/// The set of vehicles currently in service.
#[derive(Debug, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
    positions: HashMap<VehicleId, usize>,
    /// Free vehicles keyed by capacity, as positions in load order.
    free_by_seats: HashMap<Seats, BTreeSet<usize>>,
}

impl Fleet {
    /// Builds a fleet with every vehicle free.
    ///
    /// Fails if a vehicle identity is listed more than once.
    pub fn new(specs: &[VehicleSpec]) -> Result<Self, ValidationError> {
        let mut fleet = Self {
            vehicles: Vec::with_capacity(specs.len()),
            positions: HashMap::with_capacity(specs.len()),
            free_by_seats: HashMap::new(),
        };

        for (position, spec) in specs.iter().enumerate() {
            if fleet.positions.insert(spec.id, position).is_some() {
                return Err(ValidationError::DuplicateVehicle { id: spec.id });
            }
            fleet.vehicles.push(Vehicle {
                id: spec.id,
                seats: spec.seats,
                engaged: false,
            });
            fleet
                .free_by_seats
                .entry(spec.seats)
                .or_default()
                .insert(position);
        }

        Ok(fleet)
    }

    /// Replaces the whole fleet, clearing every engagement flag.
    ///
    /// On error the current fleet is left untouched. Journeys bound to the
    /// old fleet are the caller's to discard.
    pub fn load(&mut self, specs: &[VehicleSpec]) -> Result<usize, ValidationError> {
        *self = Self::new(specs)?;
        Ok(self.vehicles.len())
    }

    pub fn find_by_id(&self, id: VehicleId) -> Option<&Vehicle> {
        self.positions.get(&id).map(|&position| &self.vehicles[position])
    }

    /// Returns the first free vehicle whose capacity is exactly `seats`.
    ///
    /// Larger vehicles are never offered as a fallback.
    pub fn find_free_by_seats(&self, seats: Seats) -> Option<&Vehicle> {
        self.free_by_seats
            .get(&seats)?
            .first()
            .map(|&position| &self.vehicles[position])
    }

    /// Sets a vehicle's engagement flag. Idempotent.
    ///
    /// Returns `false` if no such vehicle is loaded; that is not an error.
    pub fn set_engaged(&mut self, id: VehicleId, engaged: bool) -> bool {
        let Some(&position) = self.positions.get(&id) else {
            return false;
        };

        let vehicle = &mut self.vehicles[position];
        if vehicle.engaged != engaged {
            vehicle.engaged = engaged;
            let free = self.free_by_seats.entry(vehicle.seats).or_default();
            if engaged {
                free.remove(&position);
            } else {
                free.insert(position);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn engaged_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.engaged).count()
    }

    /// Iterates over vehicles in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }
}
