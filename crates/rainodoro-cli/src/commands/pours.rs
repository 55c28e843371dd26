use clap::Subcommand;
use rainodoro_core::PourBucket;

use super::{open_controller, print_json, CliResult};

#[derive(Subcommand)]
pub enum PoursAction {
    /// Show pour counters
    Show,
    /// Reset one bucket (pomodoro or break), or both
    Reset { bucket: Option<PourBucket> },
}

pub fn run(action: PoursAction) -> CliResult {
    let mut controller = open_controller(false)?;
    match action {
        PoursAction::Show => {}
        PoursAction::Reset { bucket: Some(bucket) } => controller.reset_pours(bucket),
        PoursAction::Reset { bucket: None } => {
            controller.reset_pours(PourBucket::Pomodoro);
            controller.reset_pours(PourBucket::Break);
        }
    }
    print_json(controller.pours())
}
