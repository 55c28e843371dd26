use chrono::{Local, NaiveTime, TimeZone, Utc};
use clap::Subcommand;
use rainodoro_core::CompletionRecord;

use super::{open_controller, print_json, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List completed countdowns, newest last
    List {
        /// Only completions since local midnight
        #[arg(long)]
        today: bool,
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Forget all history
    Clear,
}

pub fn run(action: HistoryAction) -> CliResult {
    let mut controller = open_controller(false)?;
    match action {
        HistoryAction::List { today, limit } => {
            let since = if today {
                let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
                Local
                    .from_local_datetime(&midnight)
                    .earliest()
                    .map(|t| t.with_timezone(&Utc))
            } else {
                None
            };
            let mut records: Vec<&CompletionRecord> = controller
                .history()
                .iter()
                .filter(|r| since.map_or(true, |s| r.completed_at >= s))
                .collect();
            if let Some(limit) = limit {
                let skip = records.len().saturating_sub(limit);
                records.drain(..skip);
            }
            print_json(&records)?;
        }
        HistoryAction::Clear => {
            controller.clear_history();
            println!("history cleared");
        }
    }
    Ok(())
}
