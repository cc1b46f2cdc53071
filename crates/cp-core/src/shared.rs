//! Thread-safe handle to a [`Dispatcher`].
//!
//! All three registries sit behind a single mutex. Every operation takes the
//! lock once and holds it until it returns, which makes the
//! find-vehicle-then-engage step of a journey request and the
//! remove-journey-and-group step of a drop-off atomic with respect to every
//! other request.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::dispatcher::{Dispatcher, JourneyStarted, Snapshot};
use crate::error::DispatchError;
use crate::fleet::VehicleSpec;
use crate::journeys::{Assignment, Journey};
use crate::types::{GroupId, Seats};

/// Cloneable, shareable dispatcher.
#[derive(Debug, Clone, Default)]
pub struct SharedDispatcher {
    inner: Arc<Mutex<Dispatcher>>,
}

impl SharedDispatcher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dispatcher)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Dispatcher>, DispatchError> {
        self.inner.lock().map_err(|_| DispatchError::LockPoisoned)
    }

    pub fn load_fleet(&self, specs: &[VehicleSpec]) -> Result<usize, DispatchError> {
        self.lock()?.load_fleet(specs)
    }

    pub fn register_group(&self) -> Result<GroupId, DispatchError> {
        Ok(self.lock()?.register_group())
    }

    pub fn start_journey(
        &self,
        group: GroupId,
        seats: Seats,
    ) -> Result<JourneyStarted, DispatchError> {
        self.lock()?.start_journey(group, seats)
    }

    pub fn locate(&self, group: GroupId) -> Result<Assignment, DispatchError> {
        self.lock()?.locate(group)
    }

    pub fn drop_off(&self, group: GroupId) -> Result<Journey, DispatchError> {
        self.lock()?.drop_off(group)
    }

    pub fn snapshot(&self) -> Result<Snapshot, DispatchError> {
        Ok(self.lock()?.snapshot())
    }

    pub fn verify(&self) -> Result<(), DispatchError> {
        self.lock()?.verify()
    }
}

impl From<Dispatcher> for SharedDispatcher {
    fn from(dispatcher: Dispatcher) -> Self {
        Self::new(dispatcher)
    }
}
