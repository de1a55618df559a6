//! Fleet registry service implementation.
//!
//! This module provides the `Fleet` trait and the `FleetStore` implementation
//! that registers vehicles and moves them between status categories.

use std::sync::Arc;

use busfleet_core::{PlateNumber, VehicleId};
use busfleet_store::{AuditReport, Membership, RocksStore, Status, Store, StoreConfig, Vehicle};
use chrono::Utc;

use crate::error::{FleetError, Result};
use crate::placement;
use crate::types::{RegisterVehicleRequest, StatusReport, StatusRow, VehicleSummary};

/// Trait defining the fleet registry operations.
///
/// Every write is all-or-nothing; a failed call leaves the store untouched.
pub trait Fleet: Send + Sync {
    // =========================================================================
    // Roster Operations
    // =========================================================================

    /// Register a new vehicle. It starts out registered but undeployed.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::AlreadyExists` if the plate is already registered.
    fn register_vehicle(&self, request: RegisterVehicleRequest) -> Result<Vehicle>;

    /// Get a vehicle by plate.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::NotFound` if the plate is not registered.
    fn get_vehicle(&self, plate: &PlateNumber) -> Result<Vehicle>;

    /// List the whole roster in registration order.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::Storage` if the roster cannot be read.
    fn list_vehicles(&self) -> Result<Vec<VehicleSummary>>;

    /// Remove a vehicle and every status membership it holds.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::NotFound` if the plate is not registered.
    fn delete_vehicle(&self, plate: &PlateNumber) -> Result<()>;

    // =========================================================================
    // Status Operations
    // =========================================================================

    /// List the vehicles currently in `status`. Empty when none are.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::Storage` if the category cannot be read.
    fn list_by_status(&self, status: Status) -> Result<Vec<StatusRow>>;

    /// Report where a vehicle currently is.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::NotFound` if the plate is not registered.
    fn find_vehicle_status(&self, plate: &PlateNumber) -> Result<StatusReport>;

    /// Move a vehicle into `status`, evicting it from every other category.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::NotFound` if the plate is not registered.
    fn set_status(&self, plate: &PlateNumber, status: Status) -> Result<Membership>;

    /// Take a vehicle out of all categories. Clearing an undeployed vehicle
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::NotFound` if the plate is not registered.
    fn clear_status(&self, plate: &PlateNumber) -> Result<()>;

    // =========================================================================
    // Operational
    // =========================================================================

    /// Check the membership collections for exclusivity violations and orphans.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::Storage` if a collection cannot be scanned. An
    /// inconsistent store is reported in the `AuditReport`, not as an error.
    fn audit(&self) -> Result<AuditReport>;
}

/// The fleet registry backed by a [`Store`].
pub struct FleetStore<S: Store> {
    store: Arc<S>,
}

impl<S: Store> FleetStore<S> {
    /// Create a new registry over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl FleetStore<RocksStore> {
    /// Open a `RocksDB`-backed registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let store = RocksStore::open_with_config(config)?;
        Ok(Self::new(Arc::new(store)))
    }
}

impl<S: Store> Fleet for FleetStore<S> {
    // =========================================================================
    // Roster Operations
    // =========================================================================

    fn register_vehicle(&self, request: RegisterVehicleRequest) -> Result<Vehicle> {
        let vehicle = Vehicle {
            vehicle_id: VehicleId::generate(),
            plate_number: request.plate_number,
            driver_first_name: request.driver_first_name,
            driver_last_name: request.driver_last_name,
            route_number: request.route_number,
            registered_at: Utc::now(),
        };

        if let Err(err) = self.store.insert_vehicle(&vehicle) {
            let err = FleetError::for_plate(err, &vehicle.plate_number);
            if err.is_conflict() {
                tracing::warn!(plate = %vehicle.plate_number, "Plate already registered");
            }
            return Err(err);
        }

        tracing::info!(
            vehicle_id = %vehicle.vehicle_id,
            plate = %vehicle.plate_number,
            route = %vehicle.route_number,
            "Registered vehicle"
        );

        Ok(vehicle)
    }

    fn get_vehicle(&self, plate: &PlateNumber) -> Result<Vehicle> {
        self.store
            .get_vehicle_by_plate(plate)?
            .ok_or_else(|| FleetError::NotFound(plate.clone()))
    }

    fn list_vehicles(&self) -> Result<Vec<VehicleSummary>> {
        let vehicles = self.store.list_vehicles()?;
        tracing::debug!(count = vehicles.len(), "Listed vehicles");
        Ok(vehicles.into_iter().map(VehicleSummary::from).collect())
    }

    fn delete_vehicle(&self, plate: &PlateNumber) -> Result<()> {
        let vehicle = self
            .store
            .delete_vehicle(plate)
            .map_err(|e| FleetError::for_plate(e, plate))?;

        tracing::info!(
            vehicle_id = %vehicle.vehicle_id,
            plate = %plate,
            "Deleted vehicle"
        );

        Ok(())
    }

    // =========================================================================
    // Status Operations
    // =========================================================================

    fn list_by_status(&self, status: Status) -> Result<Vec<StatusRow>> {
        let entries = self.store.list_by_status(status)?;
        tracing::debug!(status = %status, count = entries.len(), "Listed vehicles by status");
        Ok(entries.into_iter().map(StatusRow::from).collect())
    }

    fn find_vehicle_status(&self, plate: &PlateNumber) -> Result<StatusReport> {
        let record = self
            .store
            .locate(plate)?
            .ok_or_else(|| FleetError::NotFound(plate.clone()))?;

        if !placement::is_exclusive(&record.memberships) {
            let statuses: Vec<_> = record.memberships.iter().map(|m| m.status).collect();
            tracing::error!(
                vehicle_id = %record.vehicle.vehicle_id,
                plate = %plate,
                statuses = ?statuses,
                "Vehicle occupies several status categories"
            );
        }

        let placement = placement::resolve(&record.memberships);

        Ok(StatusReport {
            vehicle: VehicleSummary::from(record.vehicle),
            placement,
        })
    }

    fn set_status(&self, plate: &PlateNumber, status: Status) -> Result<Membership> {
        let membership = self
            .store
            .set_status(plate, status, Utc::now())
            .map_err(|e| FleetError::for_plate(e, plate))?;

        tracing::info!(
            vehicle_id = %membership.vehicle_id,
            plate = %plate,
            status = %status,
            "Changed vehicle status"
        );

        Ok(membership)
    }

    fn clear_status(&self, plate: &PlateNumber) -> Result<()> {
        let removed = self
            .store
            .clear_status(plate)
            .map_err(|e| FleetError::for_plate(e, plate))?;

        if removed > 0 {
            tracing::info!(plate = %plate, removed, "Cleared vehicle status");
        }

        Ok(())
    }

    // =========================================================================
    // Operational
    // =========================================================================

    fn audit(&self) -> Result<AuditReport> {
        let report = self.store.audit()?;

        if !report.is_clean() {
            tracing::warn!(
                duplicated = report.duplicated.len(),
                orphaned = report.orphaned.len(),
                "Audit found inconsistent status memberships"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Placement;
    use tempfile::TempDir;

    fn setup() -> (FleetStore<RocksStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        (FleetStore::new(store), dir)
    }

    fn plate(s: &str) -> PlateNumber {
        PlateNumber::parse(s).unwrap()
    }

    fn register(fleet: &FleetStore<RocksStore>, plate_number: &str, route: &str) -> Vehicle {
        let request = RegisterVehicleRequest::new(plate(plate_number), "Ivan", "Petrov", route);
        fleet.register_vehicle(request).unwrap()
    }

    #[test]
    fn register_vehicle_success() {
        let (fleet, _dir) = setup();

        let vehicle = register(&fleet, "7744", "12");

        assert_eq!(vehicle.plate_number, plate("7744"));
        assert_eq!(vehicle.route_number, "12");
        assert_eq!(fleet.get_vehicle(&plate("7744")).unwrap(), vehicle);
    }

    #[test]
    fn register_duplicate_plate() {
        let (fleet, _dir) = setup();
        register(&fleet, "7744", "12");

        let request = RegisterVehicleRequest::new(plate("7744"), "Petr", "Ivanov", "40");
        let result = fleet.register_vehicle(request);

        assert!(matches!(result, Err(FleetError::AlreadyExists(p)) if p == plate("7744")));
        let roster = fleet.list_vehicles().unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].driver_first_name, "Ivan");
    }

    #[test]
    fn new_vehicle_is_undeployed() {
        let (fleet, _dir) = setup();
        register(&fleet, "7744", "12");

        let report = fleet.find_vehicle_status(&plate("7744")).unwrap();
        assert_eq!(report.placement, Placement::Undeployed);
    }

    #[test]
    fn find_vehicle_status_reports_current_category() {
        let (fleet, _dir) = setup();
        register(&fleet, "7744", "12");

        let membership = fleet.set_status(&plate("7744"), Status::InService).unwrap();

        let report = fleet.find_vehicle_status(&plate("7744")).unwrap();
        assert_eq!(
            report.placement,
            Placement::Deployed {
                status: Status::InService,
                since: membership.event_time
            }
        );
    }

    #[test]
    fn unknown_plate_is_not_found() {
        let (fleet, _dir) = setup();
        let unknown = plate("404");

        assert!(fleet.get_vehicle(&unknown).unwrap_err().is_not_found());
        assert!(fleet.find_vehicle_status(&unknown).unwrap_err().is_not_found());
        assert!(fleet
            .set_status(&unknown, Status::OnRoute)
            .unwrap_err()
            .is_not_found());
        assert!(fleet.clear_status(&unknown).unwrap_err().is_not_found());
        assert!(fleet.delete_vehicle(&unknown).unwrap_err().is_not_found());
        assert!(fleet.list_by_status(Status::OnRoute).unwrap().is_empty());
    }

    #[test]
    fn clear_status_twice() {
        let (fleet, _dir) = setup();
        register(&fleet, "7744", "12");
        fleet.set_status(&plate("7744"), Status::OnRoute).unwrap();

        fleet.clear_status(&plate("7744")).unwrap();
        fleet.clear_status(&plate("7744")).unwrap();

        let report = fleet.find_vehicle_status(&plate("7744")).unwrap();
        assert_eq!(report.placement, Placement::Undeployed);
        assert!(fleet.list_by_status(Status::OnRoute).unwrap().is_empty());
    }

    #[test]
    fn delete_vehicle_cascades() {
        let (fleet, _dir) = setup();
        register(&fleet, "7744", "12");
        fleet.set_status(&plate("7744"), Status::OnRoute).unwrap();

        fleet.delete_vehicle(&plate("7744")).unwrap();

        assert!(fleet
            .find_vehicle_status(&plate("7744"))
            .unwrap_err()
            .is_not_found());
        assert!(fleet.list_by_status(Status::OnRoute).unwrap().is_empty());
        assert!(fleet.list_vehicles().unwrap().is_empty());
        assert!(fleet.audit().unwrap().is_clean());
    }

    #[test]
    fn list_by_status_rows() {
        let (fleet, _dir) = setup();
        register(&fleet, "100", "7");
        register(&fleet, "200", "8");
        fleet.set_status(&plate("200"), Status::InDepot).unwrap();

        let rows = fleet.list_by_status(Status::InDepot).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plate_number, plate("200"));
        assert_eq!(rows[0].route_number, "8");
        assert!(fleet.list_by_status(Status::OnRoute).unwrap().is_empty());
    }
}
