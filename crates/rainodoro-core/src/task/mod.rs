//! Task and break lists.
//!
//! Tasks are credited when a pomodoro finishes; break items are credited
//! when a short or long break finishes. Both carry a `target` (how many
//! completions the user is aiming for) and a `completed` counter.

mod breaks;
mod selection;

pub use breaks::{BreakItem, BreakKind, BreakLists};
pub use selection::{ItemKind, Selection};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default = "default_target")]
    pub target: u32,
    #[serde(default)]
    pub completed: u32,
}

pub(crate) fn default_target() -> u32 {
    1
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Apply `delta` to a target, never going below one.
pub(crate) fn adjust_target(target: u32, delta: i32) -> u32 {
    let next = i64::from(target) + i64::from(delta);
    next.clamp(1, i64::from(u32::MAX)) as u32
}

pub(crate) fn clean_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

/// Ordered list of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from stored tasks, repairing targets below one.
    pub fn from_tasks(mut tasks: Vec<Task>) -> Self {
        for task in &mut tasks {
            task.target = task.target.max(1);
        }
        Self { tasks }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Task, ValidationError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ValidationError::UnknownTask(id.to_string()))
    }

    /// Append a task with a target of one.
    pub fn add(&mut self, title: &str) -> Result<&Task, ValidationError> {
        self.add_with_target(title, 1)
    }

    pub fn add_with_target(&mut self, title: &str, target: u32) -> Result<&Task, ValidationError> {
        let task = Task {
            id: new_id(),
            title: clean_title(title)?,
            target: target.max(1),
            completed: 0,
        };
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Result<Task, ValidationError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ValidationError::UnknownTask(id.to_string()))?;
        Ok(self.tasks.remove(idx))
    }

    /// Returns the new target.
    pub fn change_target(&mut self, id: &str, delta: i32) -> Result<u32, ValidationError> {
        let task = self.get_mut(id)?;
        task.target = adjust_target(task.target, delta);
        Ok(task.target)
    }

    pub fn rename(&mut self, id: &str, title: &str) -> Result<(), ValidationError> {
        let title = clean_title(title)?;
        self.get_mut(id)?.title = title;
        Ok(())
    }

    /// Move a task to position `index` (drag-and-drop reorder).
    pub fn move_to(&mut self, id: &str, index: usize) -> Result<(), ValidationError> {
        let len = self.tasks.len();
        if index >= len {
            return Err(ValidationError::OutOfBounds {
                collection: "tasks".into(),
                index,
                len,
            });
        }
        let task = self.remove(id)?;
        self.tasks.insert(index, task);
        Ok(())
    }

    /// Returns the new completed count.
    pub fn increment_completed(&mut self, id: &str) -> Result<u32, ValidationError> {
        let task = self.get_mut(id)?;
        task.completed = task.completed.saturating_add(1);
        Ok(task.completed)
    }
}
