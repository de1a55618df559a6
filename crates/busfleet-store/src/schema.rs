//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

use crate::types::Status;

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary vehicle records, keyed by `vehicle_id`.
    pub const VEHICLES: &str = "vehicles";

    /// Index: vehicle id by plate, keyed by the normalized plate bytes.
    pub const VEHICLES_BY_PLATE: &str = "vehicles_by_plate";

    /// Memberships of vehicles on route, keyed by `vehicle_id`.
    pub const ON_ROUTE: &str = "on_route";

    /// Memberships of vehicles idle in the depot, keyed by `vehicle_id`.
    pub const IN_DEPOT: &str = "in_depot";

    /// Memberships of vehicles in maintenance, keyed by `vehicle_id`.
    pub const IN_SERVICE: &str = "in_service";
}

/// Returns the column family holding memberships for `status`.
#[must_use]
pub const fn status_column_family(status: Status) -> &'static str {
    match status {
        Status::OnRoute => cf::ON_ROUTE,
        Status::InDepot => cf::IN_DEPOT,
        Status::InService => cf::IN_SERVICE,
    }
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::VEHICLES,
        cf::VEHICLES_BY_PLATE,
        cf::ON_ROUTE,
        cf::IN_DEPOT,
        cf::IN_SERVICE,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_declared_family() {
        let families = all_column_families();
        for status in Status::ALL {
            assert!(families.contains(&status_column_family(status)));
        }
    }
}
