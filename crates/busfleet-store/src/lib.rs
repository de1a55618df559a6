//! `RocksDB` storage layer for busfleet.
//!
//! This crate provides persistent storage for the vehicle roster and the three
//! status categories using `RocksDB` with column families.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `vehicles`: Primary vehicle records, keyed by `vehicle_id`
//! - `vehicles_by_plate`: Unique index from plate number to `vehicle_id`
//! - `on_route`, `in_depot`, `in_service`: Status memberships, keyed by `vehicle_id`
//!
//! Keying every membership family by vehicle id makes a vehicle unique within
//! a category. Uniqueness *across* categories is enforced by [`Store::set_status`],
//! which removes the vehicle from all three families and inserts the new row in
//! one atomic batch.
//!
//! # Example
//!
//! ```no_run
//! use busfleet_core::PlateNumber;
//! use busfleet_store::{RocksStore, Status, Store};
//!
//! let store = RocksStore::open("/tmp/busfleet-db").unwrap();
//!
//! let plate = PlateNumber::parse("7744").unwrap();
//! store.set_status(&plate, Status::OnRoute, chrono::Utc::now()).unwrap();
//! let on_route = store.list_by_status(Status::OnRoute).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;
pub mod types;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use rocks::RocksStore;
pub use types::{
    AuditReport, DuplicatedMembership, Membership, ParseStatusError, Status, StatusEntry,
    Vehicle, VehicleRecord,
};

use busfleet_core::PlateNumber;
use chrono::{DateTime, Utc};

/// The storage trait defining all database operations.
///
/// Every mutating method is a single transactional unit: it either applies in
/// full or not at all, and concurrent readers never observe it half-done.
pub trait Store: Send + Sync {
    // =========================================================================
    // Vehicle Operations
    // =========================================================================

    /// Insert a new vehicle record and its plate index entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the plate is already registered.
    fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<()>;

    /// Get a vehicle by plate number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_vehicle_by_plate(&self, plate: &PlateNumber) -> Result<Option<Vehicle>>;

    /// List all vehicles in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_vehicles(&self) -> Result<Vec<Vehicle>>;

    /// Delete a vehicle together with its plate index entry and every
    /// membership row referencing it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the plate is not registered.
    fn delete_vehicle(&self, plate: &PlateNumber) -> Result<Vehicle>;

    // =========================================================================
    // Status Operations
    // =========================================================================

    /// Get a vehicle and all membership rows referencing it, read from one
    /// consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn locate(&self, plate: &PlateNumber) -> Result<Option<VehicleRecord>>;

    /// List every vehicle in the given category, joined with its membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_by_status(&self, status: Status) -> Result<Vec<StatusEntry>>;

    /// Move a vehicle into `status`.
    ///
    /// Removes the vehicle from all three categories, including `status`
    /// itself, then inserts a fresh membership stamped with `event_time`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the plate is not registered.
    fn set_status(
        &self,
        plate: &PlateNumber,
        status: Status,
        event_time: DateTime<Utc>,
    ) -> Result<Membership>;

    /// Remove a vehicle from all three categories.
    ///
    /// Returns the number of membership rows removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the plate is not registered.
    fn clear_status(&self, plate: &PlateNumber) -> Result<usize>;

    /// Scan the membership families for exclusivity violations and orphans.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn audit(&self) -> Result<AuditReport>;
}
