//! Fleet registry for busfleet.
//!
//! This crate provides the business logic for tracking which buses the
//! enterprise owns and which operational category each one is in. It sits on
//! top of the storage layer and turns its primitive errors into
//! plate-addressed ones.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  busfleet CLI / interactive shell           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         FleetStore                          │
//! │  ┌─────────────┐ ┌─────────────────┐ ┌─────────────────┐    │
//! │  │   Roster    │ │  Status moves   │ │    Placement    │    │
//! │  │   CRUD      │ │  (exclusive)    │ │    resolution   │    │
//! │  └─────────────┘ └─────────────────┘ └─────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌─────────────┐
//!                       │    Store    │
//!                       │  (RocksDB)  │
//!                       └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use busfleet_registry::{Fleet, FleetStore, PlateNumber, RegisterVehicleRequest, Status};
//! use busfleet_store::RocksStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/busfleet")?);
//! let fleet = FleetStore::new(store);
//!
//! let plate = PlateNumber::parse("7744")?;
//! fleet.register_vehicle(RegisterVehicleRequest::new(plate.clone(), "Ivan", "Petrov", "12"))?;
//! fleet.set_status(&plate, Status::OnRoute)?;
//!
//! println!("{}", fleet.find_vehicle_status(&plate)?);
//! # Ok(())
//! # }
//! ```
//!
//! # States
//!
//! A registered vehicle is either undeployed or in exactly one of
//! `OnRoute`, `InDepot` and `InService`. See the [`placement`] module.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod placement;
pub mod service;
pub mod types;

pub use error::{FleetError, Result};
pub use placement::Placement;
pub use service::{Fleet, FleetStore};
pub use types::{RegisterVehicleRequest, StatusReport, StatusRow, VehicleSummary};

// Re-export commonly used types from dependencies for convenience
pub use busfleet_core::{PlateNumber, VehicleId};
pub use busfleet_store::{AuditReport, Membership, Status, StoreConfig, Vehicle};
