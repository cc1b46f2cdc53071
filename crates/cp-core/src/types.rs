//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types and request input.
///
/// None of these ever leave the dispatcher in a modified state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The value was zero where a positive integer is required.
    #[error("{field} must be a positive integer")]
    Zero { field: &'static str },

    /// The value could not be parsed as a positive integer.
    #[error("{field} must be a positive integer, got {value:?}")]
    Malformed { field: &'static str, value: String },

    /// A required field was absent from the request.
    #[error("{field} is required")]
    Missing { field: &'static str },

    /// The same vehicle identity was listed twice in one fleet.
    #[error("vehicle {id} appears more than once in the fleet")]
    DuplicateVehicle { id: VehicleId },
}

impl ValidationError {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Zero { .. } | Self::Malformed { .. } => "invalid_field",
            Self::Missing { .. } => "missing_field",
            Self::DuplicateVehicle { .. } => "duplicate_vehicle",
        }
    }
}

/// Generates a positive integer newtype with common trait implementations.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty), $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($inner);

        impl $name {
            /// Creates a new value, rejecting zero.
            pub const fn new(value: $inner) -> Result<Self, ValidationError> {
                if value == 0 {
                    return Err(ValidationError::Zero { field: $field_name });
                }
                Ok(Self(value))
            }

            /// Returns the raw integer.
            #[must_use]
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl TryFrom<$inner> for $name {
            type Error = ValidationError;

            fn try_from(value: $inner) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<$inner>()
                    .map_err(|_| ValidationError::Malformed {
                        field: $field_name,
                        value: s.to_string(),
                    })?;
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.0.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <$inner>::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Generates the successor function for identities handed out by a counter.
macro_rules! impl_sequenced {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                /// Returns the identity following `last`, or the first one.
                pub(crate) const fn after(last: Option<Self>) -> Self {
                    match last {
                        Some(id) => Self(id.0 + 1),
                        None => Self(1),
                    }
                }
            }
        )*
    };
}

define_numeric_id!(
    /// A vehicle identity, assigned by whoever loads the fleet.
    VehicleId(u64), "vehicle id"
);

define_numeric_id!(
    /// A group identity. Issued by the group registry, never reused.
    GroupId(u64), "group id"
);

define_numeric_id!(
    /// A journey identity. Issued by the journey ledger, never reused.
    JourneyId(u64), "journey id"
);

define_numeric_id!(
    /// A seat count: vehicle capacity or the size of a group's request.
    Seats(u32), "seats"
);

impl_sequenced!(GroupId, JourneyId);
