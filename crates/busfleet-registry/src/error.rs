//! Error types for the fleet registry.
//!
//! This module defines all errors that can occur while registering vehicles
//! and moving them between status categories.

use busfleet_core::PlateNumber;
use busfleet_store::StoreError;
use thiserror::Error;

/// A result type using `FleetError`.
pub type Result<T> = std::result::Result<T, FleetError>;

/// Errors that can occur in fleet registry operations.
#[derive(Debug, Error)]
pub enum FleetError {
    /// A vehicle with this plate is already registered. Nothing was written.
    #[error("vehicle {0} is already registered")]
    AlreadyExists(PlateNumber),

    /// No vehicle with this plate is registered. Nothing was written.
    #[error("vehicle {0} is not registered")]
    NotFound(PlateNumber),

    /// The backing store failed; the operation was rolled back in full.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl FleetError {
    /// Translate a store error raised while operating on `plate`.
    pub(crate) fn for_plate(err: StoreError, plate: &PlateNumber) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound(plate.clone()),
            StoreError::AlreadyExists => Self::AlreadyExists(plate.clone()),
            other => Self::Storage(other),
        }
    }

    /// Returns true for a duplicate registration.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    /// Returns true if the plate was not registered.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Storage(_) => 1,
            Self::NotFound(_) => 2,
            Self::AlreadyExists(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_gain_plate_context() {
        let plate = PlateNumber::parse("7744").unwrap();

        let err = FleetError::for_plate(StoreError::NotFound, &plate);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "vehicle 7744 is not registered");

        let err = FleetError::for_plate(StoreError::AlreadyExists, &plate);
        assert!(err.is_conflict());

        let err = FleetError::for_plate(StoreError::Database("disk full".into()), &plate);
        assert!(matches!(err, FleetError::Storage(_)));
    }

    #[test]
    fn exit_codes() {
        let plate = PlateNumber::parse("1").unwrap();
        assert_eq!(FleetError::NotFound(plate.clone()).exit_code(), 2);
        assert_eq!(FleetError::AlreadyExists(plate).exit_code(), 3);
        assert_eq!(
            FleetError::Storage(StoreError::Database("io".into())).exit_code(),
            1
        );
    }
}
