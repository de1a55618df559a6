//! Domain types stored in the database.
//!
//! These types represent the persisted state of vehicles and their status
//! memberships.

use std::fmt;
use std::str::FromStr;

use busfleet_core::{MembershipId, PlateNumber, VehicleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vehicle record stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Surrogate identifier, assigned at registration.
    pub vehicle_id: VehicleId,
    /// Registration plate, unique across the fleet.
    pub plate_number: PlateNumber,
    /// Driver's first name.
    pub driver_first_name: String,
    /// Driver's last name.
    pub driver_last_name: String,
    /// Route the vehicle is assigned to.
    pub route_number: String,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

/// The three mutually exclusive operational categories.
///
/// Declaration order is the lookup priority used when reporting a vehicle's
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Operating its assigned route.
    OnRoute,
    /// Parked at the depot, awaiting assignment.
    InDepot,
    /// Undergoing maintenance.
    InService,
}

impl Status {
    /// All statuses in lookup priority order.
    pub const ALL: [Self; 3] = [Self::OnRoute, Self::InDepot, Self::InService];

    /// Stable, command-line friendly name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnRoute => "on-route",
            Self::InDepot => "in-depot",
            Self::InService => "in-service",
        }
    }

    /// Human-readable description used in reports.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::OnRoute => "on route",
            Self::InDepot => "in depot, awaiting assignment",
            Self::InService => "in service (maintenance)",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "on-route" | "route" | "line" => Ok(Self::OnRoute),
            "in-depot" | "depot" | "park" => Ok(Self::InDepot),
            "in-service" | "service" | "maintenance" => Ok(Self::InService),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Error returned when a status name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status {0:?}: expected on-route, in-depot or in-service")]
pub struct ParseStatusError(String);

/// A status membership row: "this vehicle entered this category at this time".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Unique identifier of this row.
    pub membership_id: MembershipId,
    /// The vehicle occupying the category.
    pub vehicle_id: VehicleId,
    /// The category this row belongs to.
    pub status: Status,
    /// When the vehicle entered the category.
    pub event_time: DateTime<Utc>,
}

impl Membership {
    /// Create a fresh membership row with a new identifier.
    #[must_use]
    pub fn new(vehicle_id: VehicleId, status: Status, event_time: DateTime<Utc>) -> Self {
        Self {
            membership_id: MembershipId::generate(),
            vehicle_id,
            status,
            event_time,
        }
    }
}

/// A membership joined with the vehicle it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// The vehicle.
    pub vehicle: Vehicle,
    /// Its membership in the listed category.
    pub membership: Membership,
}

/// A vehicle together with every membership row that references it.
///
/// Memberships are in lookup priority order. A consistent store never
/// returns more than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRecord {
    /// The vehicle.
    pub vehicle: Vehicle,
    /// Membership rows referencing the vehicle.
    pub memberships: Vec<Membership>,
}

/// Result of scanning the membership collections for inconsistencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Vehicles referenced by more than one membership collection.
    pub duplicated: Vec<DuplicatedMembership>,
    /// Membership rows whose vehicle no longer exists.
    pub orphaned: Vec<Membership>,
}

impl AuditReport {
    /// Returns true if no inconsistency was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.duplicated.is_empty() && self.orphaned.is_empty()
    }
}

/// A vehicle that appears in several status categories at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatedMembership {
    /// The affected vehicle.
    pub vehicle_id: VehicleId,
    /// Every category it appears in, in priority order.
    pub statuses: Vec<Status>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_aliases() {
        assert_eq!("on-route".parse::<Status>().unwrap(), Status::OnRoute);
        assert_eq!("LINE".parse::<Status>().unwrap(), Status::OnRoute);
        assert_eq!("in_depot".parse::<Status>().unwrap(), Status::InDepot);
        assert_eq!("park".parse::<Status>().unwrap(), Status::InDepot);
        assert_eq!(" maintenance ".parse::<Status>().unwrap(), Status::InService);
        assert!("scrapped".parse::<Status>().is_err());
    }

    #[test]
    fn status_display_parses_back() {
        for status in Status::ALL {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn priority_order() {
        assert_eq!(
            Status::ALL,
            [Status::OnRoute, Status::InDepot, Status::InService]
        );
        assert!(Status::OnRoute < Status::InDepot);
        assert!(Status::InDepot < Status::InService);

        let mut shuffled = [Status::InService, Status::OnRoute, Status::InDepot];
        shuffled.sort();
        assert_eq!(shuffled, Status::ALL);
    }
}
