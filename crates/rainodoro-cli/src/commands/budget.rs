use clap::Subcommand;
use rainodoro_core::Mode;

use super::{open_controller, print_json, CliResult};

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Show all budgets
    Show,
    /// Increment a mode's budget
    Inc { mode: Mode },
    /// Decrement a mode's budget (stops at zero)
    Dec { mode: Mode },
}

pub fn run(action: BudgetAction) -> CliResult {
    let mut controller = open_controller(false)?;
    match action {
        BudgetAction::Show => {}
        BudgetAction::Inc { mode } => {
            controller.increment_budget(mode);
        }
        BudgetAction::Dec { mode } => {
            controller.decrement_budget(mode);
        }
    }
    print_json(controller.budgets())
}
