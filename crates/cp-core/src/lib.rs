//! Core domain logic for the car pooling service.
//!
//! This crate contains:
//! - Fleet registry: vehicles, capacities and engagement flags
//! - Group registry and journey ledger
//! - Dispatcher: exact-capacity, first-available allocation
//! - `SharedDispatcher`: the same, behind one lock

mod dispatcher;
mod error;
pub mod fleet;
pub mod groups;
pub mod journeys;
mod shared;
pub mod types;

pub use dispatcher::{Dispatcher, JourneyStarted, Snapshot};
pub use error::{DispatchError, ErrorClass};
pub use fleet::{Fleet, Vehicle, VehicleSpec};
pub use groups::GroupRegistry;
pub use journeys::{Assignment, Journey, JourneyLedger};
pub use shared::SharedDispatcher;
pub use types::{GroupId, JourneyId, Seats, ValidationError, VehicleId};
