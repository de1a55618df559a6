//! Request and response types for fleet registry operations.

use std::fmt;

use busfleet_core::PlateNumber;
use busfleet_store::{StatusEntry, Vehicle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::placement::Placement;

/// Request to register a new vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVehicleRequest {
    /// Registration plate; must not be registered yet.
    pub plate_number: PlateNumber,
    /// Driver's first name.
    pub driver_first_name: String,
    /// Driver's last name.
    pub driver_last_name: String,
    /// Route the vehicle will serve.
    pub route_number: String,
}

impl RegisterVehicleRequest {
    /// Create a request; surrounding whitespace is trimmed from the text fields.
    #[must_use]
    pub fn new(
        plate_number: PlateNumber,
        driver_first_name: impl Into<String>,
        driver_last_name: impl Into<String>,
        route_number: impl Into<String>,
    ) -> Self {
        Self {
            plate_number,
            driver_first_name: driver_first_name.into().trim().to_string(),
            driver_last_name: driver_last_name.into().trim().to_string(),
            route_number: route_number.into().trim().to_string(),
        }
    }
}

/// One line of the fleet roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleSummary {
    /// Registration plate.
    pub plate_number: PlateNumber,
    /// Driver's first name.
    pub driver_first_name: String,
    /// Driver's last name.
    pub driver_last_name: String,
    /// Assigned route.
    pub route_number: String,
}

impl From<Vehicle> for VehicleSummary {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            plate_number: vehicle.plate_number,
            driver_first_name: vehicle.driver_first_name,
            driver_last_name: vehicle.driver_last_name,
            route_number: vehicle.route_number,
        }
    }
}

impl fmt::Display for VehicleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.plate_number, self.driver_first_name, self.driver_last_name, self.route_number
        )
    }
}

/// One line of a by-status listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    /// Registration plate.
    pub plate_number: PlateNumber,
    /// Assigned route.
    pub route_number: String,
    /// Driver's first name.
    pub driver_first_name: String,
    /// Driver's last name.
    pub driver_last_name: String,
    /// When the vehicle entered the listed category.
    pub event_time: DateTime<Utc>,
}

impl From<StatusEntry> for StatusRow {
    fn from(entry: StatusEntry) -> Self {
        Self {
            plate_number: entry.vehicle.plate_number,
            route_number: entry.vehicle.route_number,
            driver_first_name: entry.vehicle.driver_first_name,
            driver_last_name: entry.vehicle.driver_last_name,
            event_time: entry.membership.event_time,
        }
    }
}

/// Answer to "where is this vehicle right now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// The vehicle looked up.
    pub vehicle: VehicleSummary,
    /// Its current placement.
    pub placement: Placement,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.vehicle, self.placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busfleet_store::Status;

    fn summary() -> VehicleSummary {
        VehicleSummary {
            plate_number: PlateNumber::parse("7744").unwrap(),
            driver_first_name: "Ivan".into(),
            driver_last_name: "Petrov".into(),
            route_number: "12".into(),
        }
    }

    #[test]
    fn request_trims_text_fields() {
        let request =
            RegisterVehicleRequest::new(PlateNumber::parse("1").unwrap(), " Ivan", "Petrov ", " 12 ");
        assert_eq!(request.driver_first_name, "Ivan");
        assert_eq!(request.driver_last_name, "Petrov");
        assert_eq!(request.route_number, "12");
    }

    #[test]
    fn summary_display() {
        assert_eq!(summary().to_string(), "(7744, Ivan, Petrov, 12)");
    }

    #[test]
    fn report_display() {
        let report = StatusReport {
            vehicle: summary(),
            placement: Placement::Undeployed,
        };
        assert_eq!(
            report.to_string(),
            "(7744, Ivan, Petrov, 12) is registered but not deployed"
        );
    }

    #[test]
    fn report_json_shape() {
        let since = DateTime::parse_from_rfc3339("2024-05-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let report = StatusReport {
            vehicle: summary(),
            placement: Placement::Deployed {
                status: Status::OnRoute,
                since,
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["vehicle"]["plate_number"], "7744");
        assert_eq!(json["placement"]["state"], "deployed");
        assert_eq!(json["placement"]["status"], "on_route");
    }
}
