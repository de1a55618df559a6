//! Output formatting for command results.
//!
//! Everything goes to the writer handed in, as an aligned text table or as
//! pretty-printed JSON.

use std::io::{self, Write};

use busfleet_registry::{AuditReport, Status, StatusReport, StatusRow, Vehicle, VehicleSummary};
use serde::Serialize;

/// Renders results either as text or as JSON.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    json: bool,
}

impl Renderer {
    /// Create a renderer; `json` selects machine-readable output.
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    fn json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)
    }

    pub fn registered<W: Write>(&self, out: &mut W, vehicle: &Vehicle) -> io::Result<()> {
        if self.json {
            return Self::json(out, vehicle);
        }
        writeln!(
            out,
            "Registered vehicle {} ({} {}, route {})",
            vehicle.plate_number,
            vehicle.driver_first_name,
            vehicle.driver_last_name,
            vehicle.route_number
        )
    }

    pub fn vehicle<W: Write>(&self, out: &mut W, vehicle: &Vehicle) -> io::Result<()> {
        if self.json {
            return Self::json(out, vehicle);
        }
        writeln!(out, "plate:       {}", vehicle.plate_number)?;
        writeln!(
            out,
            "driver:      {} {}",
            vehicle.driver_first_name, vehicle.driver_last_name
        )?;
        writeln!(out, "route:       {}", vehicle.route_number)?;
        writeln!(out, "vehicle id:  {}", vehicle.vehicle_id)?;
        writeln!(
            out,
            "registered:  {}",
            vehicle.registered_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }

    pub fn report<W: Write>(&self, out: &mut W, report: &StatusReport) -> io::Result<()> {
        if self.json {
            return Self::json(out, report);
        }
        writeln!(out, "{report}")
    }

    pub fn roster<W: Write>(&self, out: &mut W, vehicles: &[VehicleSummary]) -> io::Result<()> {
        if self.json {
            return Self::json(out, vehicles);
        }
        if vehicles.is_empty() {
            return writeln!(out, "No vehicles registered");
        }

        let rows: Vec<Vec<String>> = vehicles
            .iter()
            .map(|v| {
                vec![
                    v.plate_number.to_string(),
                    v.driver_first_name.clone(),
                    v.driver_last_name.clone(),
                    v.route_number.clone(),
                ]
            })
            .collect();
        write_table(out, &["PLATE", "FIRST NAME", "LAST NAME", "ROUTE"], &rows)
    }

    pub fn status_rows<W: Write>(
        &self,
        out: &mut W,
        status: Status,
        rows: &[StatusRow],
    ) -> io::Result<()> {
        if self.json {
            return Self::json(out, rows);
        }
        if rows.is_empty() {
            return writeln!(out, "No vehicles {}", status.describe());
        }

        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    r.plate_number.to_string(),
                    r.route_number.clone(),
                    r.driver_first_name.clone(),
                    r.driver_last_name.clone(),
                    r.event_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]
            })
            .collect();
        write_table(
            out,
            &["PLATE", "ROUTE", "FIRST NAME", "LAST NAME", "SINCE (UTC)"],
            &rows,
        )
    }

    pub fn audit<W: Write>(&self, out: &mut W, report: &AuditReport) -> io::Result<()> {
        if self.json {
            return Self::json(out, report);
        }
        if report.is_clean() {
            return writeln!(out, "No inconsistencies found");
        }

        for duplicate in &report.duplicated {
            let statuses: Vec<_> = duplicate.statuses.iter().map(ToString::to_string).collect();
            writeln!(
                out,
                "vehicle {} is in several categories: {}",
                duplicate.vehicle_id,
                statuses.join(", ")
            )?;
        }
        for orphan in &report.orphaned {
            writeln!(
                out,
                "{} membership {} refers to missing vehicle {}",
                orphan.status, orphan.membership_id, orphan.vehicle_id
            )?;
        }
        Ok(())
    }

    /// Confirmation line for commands without a result value.
    pub fn done<W: Write>(&self, out: &mut W, message: &str) -> io::Result<()> {
        if self.json {
            return Self::json(out, &serde_json::json!({ "ok": true, "message": message }));
        }
        writeln!(out, "{message}")
    }
}

fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = headers.iter().map(ToString::to_string).collect();
    for row in std::iter::once(&header).chain(rows) {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        writeln!(out, "{}", cells.join("  ").trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use busfleet_registry::{
        Fleet, FleetStore, PlateNumber, RegisterVehicleRequest, StoreConfig,
    };
    use tempfile::TempDir;

    fn summary(plate: &str, first: &str) -> VehicleSummary {
        VehicleSummary {
            plate_number: PlateNumber::parse(plate).unwrap(),
            driver_first_name: first.into(),
            driver_last_name: "Petrov".into(),
            route_number: "12".into(),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn roster_table_is_aligned() {
        let vehicles = vec![summary("7744", "Ivan"), summary("A100", "Konstantin")];
        let text = render(|out| Renderer::new(false).roster(out, &vehicles));

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "PLATE  FIRST NAME  LAST NAME  ROUTE");
        assert_eq!(lines[1], "7744   Ivan        Petrov     12");
        assert_eq!(lines[2], "A100   Konstantin  Petrov     12");
    }

    #[test]
    fn empty_listings() {
        let text = render(|out| Renderer::new(false).roster(out, &[]));
        assert_eq!(text, "No vehicles registered\n");

        let text = render(|out| Renderer::new(false).status_rows(out, Status::OnRoute, &[]));
        assert_eq!(text, "No vehicles on route\n");
    }

    #[test]
    fn json_roster() {
        let vehicles = vec![summary("7744", "Ivan")];
        let text = render(|out| Renderer::new(true).roster(out, &vehicles));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["plate_number"], "7744");
        assert_eq!(value[0]["route_number"], "12");
    }

    #[test]
    fn vehicle_record_from_registry() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            sync_writes: false,
            ..StoreConfig::new(dir.path())
        };
        let fleet = FleetStore::open(&config).unwrap();
        let plate = PlateNumber::parse("7744").unwrap();
        let registered = fleet
            .register_vehicle(RegisterVehicleRequest::new(plate.clone(), "Ivan", "Petrov", "12"))
            .unwrap();

        let vehicle = fleet.get_vehicle(&plate).unwrap();
        let text = render(|out| Renderer::new(false).vehicle(out, &vehicle));
        assert!(text.starts_with("plate:       7744\n"));
        assert!(text.contains("driver:      Ivan Petrov\n"));
        assert!(text.contains(&format!("vehicle id:  {}\n", registered.vehicle_id)));

        let json = render(|out| Renderer::new(true).vehicle(out, &vehicle));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vehicle_id"], registered.vehicle_id.to_string());
    }

    #[test]
    fn clean_audit() {
        let text = render(|out| Renderer::new(false).audit(out, &AuditReport::default()));
        assert_eq!(text, "No inconsistencies found\n");
    }
}
