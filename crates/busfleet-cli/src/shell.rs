//! Interactive numbered-menu shell.
//!
//! Reads one choice per line, prompts for whatever that action needs, runs it
//! against the fleet and prints the result. Errors from a single action are
//! reported inline and the loop carries on; only end of input, choice `0` or
//! a failing terminal stop it.

use std::io::{self, BufRead, Lines, Write};

use busfleet_registry::{Fleet, PlateNumber, RegisterVehicleRequest, Status};

use crate::render::Renderer;

const MENU: &str = "\
1  - find a vehicle
2  - register a vehicle
3  - delete a vehicle
4  - list all vehicles
5  - list vehicles on route
6  - list vehicles in depot
7  - list vehicles in service
8  - send a vehicle on route
9  - move a vehicle to the depot
10 - move a vehicle to service
11 - clear a vehicle's status
0  - exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Find,
    Register,
    Delete,
    ListAll,
    List(Status),
    Set(Status),
    Clear,
    Exit,
}

impl MenuItem {
    fn from_choice(choice: &str) -> Option<Self> {
        let item = match choice.trim().parse::<u8>().ok()? {
            0 => Self::Exit,
            1 => Self::Find,
            2 => Self::Register,
            3 => Self::Delete,
            4 => Self::ListAll,
            5 => Self::List(Status::OnRoute),
            6 => Self::List(Status::InDepot),
            7 => Self::List(Status::InService),
            8 => Self::Set(Status::OnRoute),
            9 => Self::Set(Status::InDepot),
            10 => Self::Set(Status::InService),
            11 => Self::Clear,
            _ => return None,
        };
        Some(item)
    }
}

/// Run the menu loop until the user exits or input ends.
pub fn run<F, R, W>(fleet: &F, input: R, out: &mut W, renderer: Renderer) -> anyhow::Result<()>
where
    F: Fleet,
    R: BufRead,
    W: Write,
{
    let mut shell = Shell {
        fleet,
        lines: input.lines(),
        out,
        renderer,
    };
    shell.run()
}

/// Result of reading input: `None` once the input is exhausted.
type Input<T> = io::Result<Option<T>>;

struct Shell<'a, F, R, W> {
    fleet: &'a F,
    lines: Lines<R>,
    out: &'a mut W,
    renderer: Renderer,
}

impl<F: Fleet, R: BufRead, W: Write> Shell<'_, F, R, W> {
    fn run(&mut self) -> anyhow::Result<()> {
        loop {
            writeln!(self.out, "\n{MENU}")?;
            let Some(choice) = self.prompt("choice")? else {
                break;
            };

            match MenuItem::from_choice(&choice) {
                Some(MenuItem::Exit) => break,
                Some(item) => match self.dispatch(item) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) if err.is::<io::Error>() => return Err(err),
                    Err(err) => {
                        tracing::debug!(?item, error = %err, "Shell action failed");
                        writeln!(self.out, "error: {err}")?;
                    }
                },
                None => writeln!(
                    self.out,
                    "unknown choice {:?}: pick a number from the menu",
                    choice.trim()
                )?,
            }
        }

        writeln!(self.out, "Bye")?;
        Ok(())
    }

    /// Run one menu action. Returns `Ok(false)` when input ran out mid-prompt.
    fn dispatch(&mut self, item: MenuItem) -> anyhow::Result<bool> {
        match item {
            MenuItem::Find => {
                let Some(plate) = self.prompt_plate()? else {
                    return Ok(false);
                };
                let report = self.fleet.find_vehicle_status(&plate)?;
                self.renderer.report(self.out, &report)?;
            }
            MenuItem::Register => {
                let Some(plate) = self.prompt_plate()? else {
                    return Ok(false);
                };
                let Some(first) = self.prompt("driver first name")? else {
                    return Ok(false);
                };
                let Some(last) = self.prompt("driver last name")? else {
                    return Ok(false);
                };
                let Some(route) = self.prompt("route number")? else {
                    return Ok(false);
                };
                let request = RegisterVehicleRequest::new(plate, first, last, route);
                let vehicle = self.fleet.register_vehicle(request)?;
                self.renderer.registered(self.out, &vehicle)?;
            }
            MenuItem::Delete => {
                let Some(plate) = self.prompt_plate()? else {
                    return Ok(false);
                };
                self.fleet.delete_vehicle(&plate)?;
                self.renderer
                    .done(self.out, &format!("Vehicle {plate} deleted"))?;
            }
            MenuItem::ListAll => {
                let vehicles = self.fleet.list_vehicles()?;
                self.renderer.roster(self.out, &vehicles)?;
            }
            MenuItem::List(status) => {
                let rows = self.fleet.list_by_status(status)?;
                self.renderer.status_rows(self.out, status, &rows)?;
            }
            MenuItem::Set(status) => {
                let Some(plate) = self.prompt_plate()? else {
                    return Ok(false);
                };
                self.fleet.set_status(&plate, status)?;
                self.renderer
                    .done(self.out, &format!("Vehicle {plate} is {}", status.describe()))?;
            }
            MenuItem::Clear => {
                let Some(plate) = self.prompt_plate()? else {
                    return Ok(false);
                };
                self.fleet.clear_status(&plate)?;
                self.renderer
                    .done(self.out, &format!("Vehicle {plate} is not deployed"))?;
            }
            MenuItem::Exit => return Ok(false),
        }
        Ok(true)
    }

    fn prompt(&mut self, label: &str) -> Input<String> {
        write!(self.out, "{label}> ")?;
        self.out.flush()?;
        self.lines.next().transpose()
    }

    /// Prompt until a valid plate is entered.
    fn prompt_plate(&mut self) -> Input<PlateNumber> {
        loop {
            let Some(line) = self.prompt("plate number")? else {
                return Ok(None);
            };
            match PlateNumber::parse(&line) {
                Ok(plate) => return Ok(Some(plate)),
                Err(err) => writeln!(self.out, "invalid plate number: {err}")?,
            }
        }
    }
}
