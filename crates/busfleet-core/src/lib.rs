//! Core types and utilities for busfleet.
//!
//! This crate provides the identifier types shared by the storage layer, the
//! fleet registry and the command-line driver:
//!
//! - **`VehicleId`**: surrogate key of a registered vehicle
//! - **`MembershipId`**: surrogate key of a status membership row
//! - **`PlateNumber`**: the caller-facing, validated registration number
//!
//! # Example
//!
//! ```
//! use busfleet_core::{PlateNumber, VehicleId};
//!
//! let plate = PlateNumber::parse(" 7744 ").unwrap();
//! assert_eq!(plate.as_str(), "7744");
//!
//! let vehicle_id = VehicleId::generate();
//! assert_eq!(vehicle_id.as_bytes().len(), 16);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{IdError, MembershipId, PlateNumber, VehicleId, MAX_PLATE_LEN};
