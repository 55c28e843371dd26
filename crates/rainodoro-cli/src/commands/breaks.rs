use clap::Subcommand;
use rainodoro_core::BreakKind;
use serde_json::json;

use super::{open_controller, print_json, resolve_id, CliController, CliResult};

#[derive(Subcommand)]
pub enum BreakAction {
    /// Add a break item
    Add {
        /// short or long
        kind: BreakKind,
        text: String,
        /// Select the new item right away
        #[arg(long)]
        select: bool,
    },
    /// List break items
    List {
        /// Only this break kind
        kind: Option<BreakKind>,
    },
    /// Select the item credited when a break completes
    Select {
        kind: BreakKind,
        /// Item ID or unique prefix
        id: String,
    },
    /// Clear a break selection
    Deselect {
        kind: BreakKind,
    },
    /// Delete a break item
    Delete {
        kind: BreakKind,
        /// Item ID or unique prefix
        id: String,
    },
    /// Change an item's target by a delta (never below 1)
    Target {
        kind: BreakKind,
        /// Item ID or unique prefix
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
}

fn item_id(controller: &CliController, kind: BreakKind, query: &str) -> CliResult<String> {
    let ids = controller.breaks().list(kind).iter().map(|it| it.id.as_str());
    resolve_id(ids, query, "break item")
}

fn listing(controller: &CliController, kind: BreakKind) -> serde_json::Value {
    json!({
        "kind": kind.mode(),
        "selected": controller.selected(kind.mode()),
        "items": controller.breaks().list(kind),
    })
}

pub fn run(action: BreakAction) -> CliResult {
    let mut controller = open_controller(false)?;

    match action {
        BreakAction::Add { kind, text, select } => {
            let item = controller.add_break_item(kind, &text)?;
            if select {
                controller.select_break_item(kind, Some(&item.id))?;
            }
            print_json(&item)?;
        }
        BreakAction::List { kind: Some(kind) } => {
            print_json(&listing(&controller, kind))?;
        }
        BreakAction::List { kind: None } => {
            let all: Vec<_> = [BreakKind::Short, BreakKind::Long]
                .into_iter()
                .map(|kind| listing(&controller, kind))
                .collect();
            print_json(&all)?;
        }
        BreakAction::Select { kind, id } => {
            let id = item_id(&controller, kind, &id)?;
            controller.select_break_item(kind, Some(&id))?;
            print_json(&listing(&controller, kind))?;
        }
        BreakAction::Deselect { kind } => {
            controller.select_break_item(kind, None)?;
            print_json(&listing(&controller, kind))?;
        }
        BreakAction::Delete { kind, id } => {
            let id = item_id(&controller, kind, &id)?;
            let item = controller.delete_break_item(kind, &id)?;
            print_json(&item)?;
        }
        BreakAction::Target { kind, id, delta } => {
            let id = item_id(&controller, kind, &id)?;
            let target = controller.change_break_target(kind, &id, delta)?;
            print_json(&json!({ "id": id, "target": target }))?;
        }
    }
    Ok(())
}
