//! Task management commands for CLI.

use clap::Subcommand;
use rainodoro_core::Mode;
use serde_json::json;

use super::{open_controller, print_json, resolve_id, CliController, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Pomodoros planned for the task
        #[arg(long, default_value = "1")]
        target: u32,
        /// Select the new task right away
        #[arg(long)]
        select: bool,
    },
    /// List tasks
    List,
    /// Select the task credited with pomodoros
    Select {
        /// Task ID or unique prefix
        id: String,
    },
    /// Clear the pomodoro selection
    Deselect,
    /// Delete a task
    Delete {
        /// Task ID or unique prefix
        id: String,
    },
    /// Change a task's target by a delta (never below 1)
    Target {
        /// Task ID or unique prefix
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
    /// Rename a task
    Rename {
        /// Task ID or unique prefix
        id: String,
        title: String,
    },
    /// Move a task to a position in the list
    Move {
        /// Task ID or unique prefix
        id: String,
        /// Zero-based position
        index: usize,
    },
}

fn task_id(controller: &CliController, query: &str) -> CliResult<String> {
    resolve_id(controller.tasks().iter().map(|t| t.id.as_str()), query, "task")
}

fn listing(controller: &CliController) -> serde_json::Value {
    json!({
        "selected": controller.selected(Mode::Pomodoro),
        "tasks": controller.tasks(),
    })
}

pub fn run(action: TaskAction) -> CliResult {
    let mut controller = open_controller(false)?;

    match action {
        TaskAction::Add {
            title,
            target,
            select,
        } => {
            let task = controller.add_task(&title)?;
            let delta = i32::try_from(target.max(1) - 1)?;
            if delta != 0 {
                controller.change_task_target(&task.id, delta)?;
            }
            if select {
                controller.select_task(Some(&task.id))?;
            }
            let task = controller.tasks().get(&task.id).cloned().unwrap_or(task);
            print_json(&task)?;
        }
        TaskAction::List => {
            print_json(&listing(&controller))?;
        }
        TaskAction::Select { id } => {
            let id = task_id(&controller, &id)?;
            controller.select_task(Some(&id))?;
            print_json(&listing(&controller))?;
        }
        TaskAction::Deselect => {
            controller.select_task(None)?;
            print_json(&listing(&controller))?;
        }
        TaskAction::Delete { id } => {
            let id = task_id(&controller, &id)?;
            let task = controller.delete_task(&id)?;
            print_json(&task)?;
        }
        TaskAction::Target { id, delta } => {
            let id = task_id(&controller, &id)?;
            let target = controller.change_task_target(&id, delta)?;
            print_json(&json!({ "id": id, "target": target }))?;
        }
        TaskAction::Rename { id, title } => {
            let id = task_id(&controller, &id)?;
            controller.rename_task(&id, &title)?;
            print_json(&controller.tasks().get(&id))?;
        }
        TaskAction::Move { id, index } => {
            let id = task_id(&controller, &id)?;
            controller.move_task(&id, index)?;
            print_json(&listing(&controller))?;
        }
    }
    Ok(())
}
