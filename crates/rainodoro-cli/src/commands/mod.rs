//! Subcommand handlers. Each opens the store, restores a controller, runs
//! one operation and prints JSON to stdout.

pub mod breaks;
pub mod budget;
pub mod config;
pub mod history;
pub mod pours;
pub mod task;
pub mod timer;

use std::io::Write;

use rainodoro_core::{format_clock, Config, Controller, Database, Event, EventSink};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub type CliController = Controller<Database, ConsoleSink>;

/// Prints events as they happen: ticks as a live clock on stderr,
/// everything else as JSON on stdout.
pub struct ConsoleSink {
    show_ticks: bool,
}

impl ConsoleSink {
    pub fn new(show_ticks: bool) -> Self {
        Self { show_ticks }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &Event) {
        if let Event::TimerTick { progress } = event {
            if self.show_ticks {
                let mut err = std::io::stderr().lock();
                let _ = write!(
                    err,
                    "\r{:>8} {:>6}  {:>3.0}%",
                    progress.mode,
                    format_clock(progress.remaining),
                    progress.percentage
                );
                let _ = err.flush();
            }
            return;
        }
        match serde_json::to_string_pretty(event) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "failed to render event"),
        }
    }
}

pub fn open_controller(show_ticks: bool) -> CliResult<CliController> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    Ok(Controller::load(db, ConsoleSink::new(show_ticks), config))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve an id from its full value or a unique prefix.
pub fn resolve_id<'a>(
    candidates: impl Iterator<Item = &'a str>,
    query: &str,
    what: &str,
) -> CliResult<String> {
    let candidates: Vec<&str> = candidates.collect();
    if candidates.iter().any(|id| *id == query) {
        return Ok(query.to_string());
    }
    let mut matches = candidates.into_iter().filter(|id| id.starts_with(query));
    let first = matches
        .next()
        .ok_or_else(|| format!("{what} not found: {query}"))?;
    if matches.next().is_some() {
        return Err(format!("ambiguous {what} id: {query}").into());
    }
    Ok(first.to_string())
}
