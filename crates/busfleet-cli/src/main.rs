//! busfleet - bus fleet registry.
//!
//! This is the entry point for the `busfleet` binary.

mod render;
mod shell;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use busfleet_registry::{
    Fleet, FleetError, FleetStore, PlateNumber, RegisterVehicleRequest, Status, StoreConfig,
};
use render::Renderer;

/// busfleet - track which buses are on route, in the depot or in service.
#[derive(Parser, Debug)]
#[command(name = "busfleet")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the fleet database.
    #[arg(long, env = "BUSFLEET_DATA_DIR", default_value = "busfleet-data")]
    data_dir: PathBuf,

    /// Do not fsync after every write.
    #[arg(long, env = "BUSFLEET_NO_SYNC")]
    no_sync: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a vehicle to the roster.
    Register {
        plate: PlateNumber,
        first_name: String,
        last_name: String,
        route: String,
    },
    /// Show a vehicle and its current category.
    Show { plate: PlateNumber },
    /// Show a vehicle's full record, including its id and registration time.
    Info { plate: PlateNumber },
    /// List every registered vehicle.
    List,
    /// List the vehicles in one category (route, depot or service).
    Status { status: Status },
    /// Move a vehicle into a category, leaving any other one.
    Set { plate: PlateNumber, status: Status },
    /// Take a vehicle out of every category.
    Clear { plate: PlateNumber },
    /// Remove a vehicle and its category membership.
    Delete { plate: PlateNumber },
    /// Check the database for broken category memberships.
    Audit,
    /// Interactive numbered menu.
    Shell,
}

/// Exit status for command-line usage errors (`EX_USAGE`).
const EXIT_USAGE: u8 = 64;

/// Exit status for a clap parse outcome: help and version requests succeed.
fn usage_status(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_USAGE
    } else {
        0
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            return match err.print() {
                Ok(()) => ExitCode::from(usage_status(&err)),
                Err(_) => ExitCode::FAILURE,
            };
        }
    };
    init_tracing(args.debug);

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<FleetError>()
                .map_or(1, FleetError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "busfleet=debug,warn"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = StoreConfig {
        sync_writes: !args.no_sync,
        ..StoreConfig::new(&args.data_dir)
    };
    tracing::debug!(
        path = %config.path.display(),
        sync = config.sync_writes,
        "Opening fleet database"
    );

    let fleet = FleetStore::open(&config)
        .with_context(|| format!("failed to open {}", config.path.display()))?;
    let renderer = Renderer::new(args.json);
    let mut out = io::stdout().lock();

    match args.command {
        Command::Register {
            plate,
            first_name,
            last_name,
            route,
        } => {
            let request = RegisterVehicleRequest::new(plate, first_name, last_name, route);
            let vehicle = fleet.register_vehicle(request)?;
            renderer.registered(&mut out, &vehicle)?;
        }
        Command::Show { plate } => {
            let report = fleet.find_vehicle_status(&plate)?;
            renderer.report(&mut out, &report)?;
        }
        Command::Info { plate } => {
            let vehicle = fleet.get_vehicle(&plate)?;
            renderer.vehicle(&mut out, &vehicle)?;
        }
        Command::List => {
            let vehicles = fleet.list_vehicles()?;
            renderer.roster(&mut out, &vehicles)?;
        }
        Command::Status { status } => {
            let rows = fleet.list_by_status(status)?;
            renderer.status_rows(&mut out, status, &rows)?;
        }
        Command::Set { plate, status } => {
            fleet.set_status(&plate, status)?;
            renderer.done(&mut out, &format!("Vehicle {plate} is {}", status.describe()))?;
        }
        Command::Clear { plate } => {
            fleet.clear_status(&plate)?;
            renderer.done(&mut out, &format!("Vehicle {plate} is not deployed"))?;
        }
        Command::Delete { plate } => {
            fleet.delete_vehicle(&plate)?;
            renderer.done(&mut out, &format!("Vehicle {plate} deleted"))?;
        }
        Command::Audit => {
            let report = fleet.audit()?;
            renderer.audit(&mut out, &report)?;
            if !report.is_clean() {
                out.flush()?;
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Shell => {
            shell::run(&fleet, io::stdin().lock(), &mut out, renderer)?;
        }
    }

    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["busfleet", "list", "--json"]).unwrap();
        assert!(args.json);
        assert!(matches!(args.command, Command::List));
    }

    #[test]
    fn parses_status_aliases() {
        let args = Args::try_parse_from(["busfleet", "set", "7744", "depot"]).unwrap();
        match args.command {
            Command::Set { plate, status } => {
                assert_eq!(plate.as_str(), "7744");
                assert_eq!(status, Status::InDepot);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_plate() {
        assert!(Args::try_parse_from(["busfleet", "show", "bad plate"]).is_err());
        assert!(Args::try_parse_from(["busfleet", "status", "garage"]).is_err());
    }

    #[test]
    fn usage_errors_exit_with_ex_usage() {
        let err = Args::try_parse_from(["busfleet", "teleport"]).unwrap_err();
        assert_eq!(usage_status(&err), EXIT_USAGE);

        let err = Args::try_parse_from(["busfleet", "show"]).unwrap_err();
        assert_eq!(usage_status(&err), EXIT_USAGE);
    }

    #[test]
    fn help_and_version_exit_cleanly() {
        let err = Args::try_parse_from(["busfleet", "--help"]).unwrap_err();
        assert_eq!(usage_status(&err), 0);

        let err = Args::try_parse_from(["busfleet", "--version"]).unwrap_err();
        assert_eq!(usage_status(&err), 0);
    }

    #[test]
    fn parses_info() {
        let args = Args::try_parse_from(["busfleet", "info", " a100 "]).unwrap();
        match args.command {
            Command::Info { plate } => assert_eq!(plate.as_str(), "A100"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn data_dir_flag() {
        let args =
            Args::try_parse_from(["busfleet", "--data-dir", "/srv/fleet", "--no-sync", "audit"])
                .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("/srv/fleet"));
        assert!(args.no_sync);
    }
}
