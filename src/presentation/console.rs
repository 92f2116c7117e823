// Console front end - Text rendering and line commands
use crate::application::dashboard_machine::Event;
use crate::domain::selection::{MinuteRange, parse_minute};
use crate::presentation::view_state::{Controls, DashboardView, PanelState};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Event),
    Help,
    Quit,
}

pub const HELP: &str = "commands: device <id> | date <YYYY-MM-DD> | range <HH:MM> <HH:MM> | help | quit";

/// Parse one line of operator input.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(HELP.to_string());
    };
    let args: Vec<&str> = words.collect();

    match (verb, args.as_slice()) {
        ("device", [id]) => Ok(Command::Dispatch(Event::DeviceSelected(id.to_string()))),
        ("date", [date]) => Ok(Command::Dispatch(Event::DateSelected(date.to_string()))),
        ("range", [start, end]) => {
            let start = parse_minute(start).ok_or_else(|| format!("bad time {:?}", start))?;
            let end = parse_minute(end).ok_or_else(|| format!("bad time {:?}", end))?;
            Ok(Command::Dispatch(Event::RangeChanged(MinuteRange::clamped(
                i32::from(start),
                i32::from(end),
            ))))
        }
        ("help", []) => Ok(Command::Help),
        ("quit" | "exit", []) => Ok(Command::Quit),
        _ => Err(format!("unrecognized command {:?}\n{}", line.trim(), HELP)),
    }
}

pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();
    match view {
        DashboardView::InitialLoading => {
            out.push_str("Loading waterjets...\n");
        }
        DashboardView::Ready {
            controls,
            banner,
            chart,
            latest,
        } => {
            render_controls(&mut out, controls);
            if let Some(message) = banner {
                let _ = writeln!(out, "! Error: {}", message);
            }

            out.push_str("\nFault probability\n");
            match chart {
                PanelState::Loading => out.push_str("  loading...\n"),
                PanelState::Failed(reason) => {
                    let _ = writeln!(out, "  unavailable: {}", reason);
                }
                PanelState::Empty => out.push_str("  no data in the selected range\n"),
                PanelState::Populated(points) => {
                    for point in points {
                        let filled = (point.probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
                        let _ = writeln!(
                            out,
                            "  {:>6} {:>6.3} |{}{}|",
                            point.time,
                            point.probability,
                            "#".repeat(filled),
                            " ".repeat(BAR_WIDTH - filled)
                        );
                    }
                }
            }

            out.push_str("\nLatest reading\n");
            match latest {
                PanelState::Loading => out.push_str("  loading...\n"),
                PanelState::Failed(reason) => {
                    let _ = writeln!(out, "  unavailable: {}", reason);
                }
                PanelState::Empty => out.push_str("  no reading\n"),
                PanelState::Populated(reading) => {
                    let _ = writeln!(out, "  Temperature:       {:.1} °C", reading.temperature);
                    let _ = writeln!(out, "  Fault probability: {:.1} %", reading.fault_probability);
                    let _ = writeln!(out, "  Updated:           {}", reading.timestamp);
                }
            }
        }
    }
    out
}

fn render_controls(out: &mut String, controls: &Controls) {
    match &controls.device_error {
        Some(error) => {
            let _ = writeln!(out, "Device: failed to load devices: {}", error);
        }
        None if controls.devices.is_empty() => out.push_str("Device: no waterjets available\n"),
        None => {
            let _ = writeln!(
                out,
                "Device: [{}]  ({})",
                controls.device,
                controls.devices.join(", ")
            );
        }
    }

    if !controls.date_enabled {
        out.push_str("Date:   (select a device first)\n");
    } else if controls.dates_loading {
        out.push_str("Date:   loading...\n");
    } else if let Some(error) = &controls.date_error {
        let _ = writeln!(out, "Date:   failed to load dates: {}", error);
    } else if controls.dates.is_empty() {
        out.push_str("Date:   no dates available\n");
    } else {
        let _ = writeln!(out, "Date:   [{}]  ({})", controls.date, controls.dates.join(", "));
    }

    if controls.range_enabled {
        let _ = writeln!(out, "Range:  {}", controls.range);
    } else {
        let _ = writeln!(out, "Range:  {} (disabled)", controls.range);
    }
}
