//! Dispatcher errors.

use thiserror::Error;

use crate::types::{GroupId, JourneyId, ValidationError};

/// Errors returned by dispatcher operations.
///
/// Every failing operation leaves the dispatcher exactly as it found it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Request input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced group is not registered.
    #[error("group {0} not found")]
    GroupNotFound(GroupId),

    /// The group exists but has no active journey.
    #[error("group {0} has no active journey")]
    JourneyNotFound(GroupId),

    /// The group already has a journey in progress.
    #[error("group {group} already has active journey {journey}")]
    JourneyAlreadyActive { group: GroupId, journey: JourneyId },

    /// Fleet and journey state disagree. Indicates a bug.
    #[error("inconsistent dispatcher state: {0}")]
    Inconsistency(String),

    /// A thread panicked while holding the dispatcher lock.
    #[error("dispatcher lock poisoned")]
    LockPoisoned,
}

/// Broad outcome class of an error, used to pick a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller sent something invalid.
    Caller,
    /// A referenced group or journey does not exist.
    NotFound,
    /// Infrastructure or invariant failure.
    Internal,
}

impl DispatchError {
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::JourneyAlreadyActive { .. } => ErrorClass::Caller,
            Self::GroupNotFound(_) | Self::JourneyNotFound(_) => ErrorClass::NotFound,
            Self::Inconsistency(_) | Self::LockPoisoned => ErrorClass::Internal,
        }
    }

    /// Stable machine-readable code for API responses.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::GroupNotFound(_) => "group_not_found",
            Self::JourneyNotFound(_) => "journey_not_found",
            Self::JourneyAlreadyActive { .. } => "journey_already_active",
            Self::Inconsistency(_) => "inconsistent_state",
            Self::LockPoisoned => "lock_poisoned",
        }
    }
}
