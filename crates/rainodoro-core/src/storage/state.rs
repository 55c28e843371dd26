//! Typed access to the persisted documents.
//!
//! Reads and writes never fail from the caller's point of view: a store
//! that cannot be reached, or a document that does not parse, is logged
//! and treated as absent so the timer falls back to its defaults.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::KvStore;
use crate::tally::{Budgets, CompletionRecord, PourCounts};
use crate::task::{BreakLists, Selection, Task};
use crate::timer::TimerSnapshot;

pub const TIMER_KEY: &str = "rainodoro_timer_v1";
pub const TASKS_KEY: &str = "rainodoro_tasks_v1";
pub const BREAKS_KEY: &str = "rainodoro_breaks_v1";
pub const BUDGETS_KEY: &str = "rainodoro_budgets_v1";
pub const POURS_KEY: &str = "rainodoro_pours_v1";
pub const SELECTION_KEY: &str = "rainodoro_selection_v1";
pub const TASK_REMAINING_KEY: &str = "rainodoro_task_remaining_v1";
pub const HISTORY_KEY: &str = "rainodoro_history_v1";
pub const BREAK_EXTENDED_KEY: &str = "rainodoro_break_extended_v1";

/// JSON documents over a [`KvStore`].
pub struct StateRepository<S> {
    store: S,
}

impl<S: KvStore> StateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "state read failed, using defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored state is corrupt, using defaults");
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "state serialization failed");
                return;
            }
        };
        if let Err(e) = self.store.set(key, &json) {
            tracing::warn!(key, error = %e, "state write failed");
        }
    }

    pub fn load_snapshot(&self) -> Option<TimerSnapshot> {
        self.load(TIMER_KEY)
    }

    pub fn save_snapshot(&mut self, snapshot: &TimerSnapshot) {
        self.save(TIMER_KEY, snapshot)
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        self.load(TASKS_KEY).unwrap_or_default()
    }

    pub fn save_tasks(&mut self, tasks: &[Task]) {
        self.save(TASKS_KEY, tasks)
    }

    pub fn load_breaks(&self) -> BreakLists {
        self.load(BREAKS_KEY).unwrap_or_default()
    }

    pub fn save_breaks(&mut self, breaks: &BreakLists) {
        self.save(BREAKS_KEY, breaks)
    }

    pub fn load_budgets(&self) -> Budgets {
        self.load(BUDGETS_KEY).unwrap_or_default()
    }

    pub fn save_budgets(&mut self, budgets: &Budgets) {
        self.save(BUDGETS_KEY, budgets)
    }

    pub fn load_pours(&self) -> PourCounts {
        self.load(POURS_KEY).unwrap_or_default()
    }

    pub fn save_pours(&mut self, pours: &PourCounts) {
        self.save(POURS_KEY, pours)
    }

    pub fn load_selection(&self) -> Selection {
        self.load(SELECTION_KEY).unwrap_or_default()
    }

    pub fn save_selection(&mut self, selection: &Selection) {
        self.save(SELECTION_KEY, selection)
    }

    pub fn load_task_remaining(&self) -> HashMap<String, u64> {
        self.load(TASK_REMAINING_KEY).unwrap_or_default()
    }

    pub fn save_task_remaining(&mut self, memory: &HashMap<String, u64>) {
        self.save(TASK_REMAINING_KEY, memory)
    }

    pub fn load_history(&self) -> Vec<CompletionRecord> {
        self.load(HISTORY_KEY).unwrap_or_default()
    }

    pub fn save_history(&mut self, records: &[CompletionRecord]) {
        self.save(HISTORY_KEY, records)
    }

    pub fn load_break_extended(&self) -> bool {
        self.load(BREAK_EXTENDED_KEY).unwrap_or(false)
    }

    pub fn save_break_extended(&mut self, extended: bool) {
        self.save(BREAK_EXTENDED_KEY, &extended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::timer::{Mode, TimerEngine};

    #[test]
    fn snapshot_roundtrip() {
        let mut repo = StateRepository::new(MemoryStore::new());
        assert!(repo.load_snapshot().is_none());
        let mut engine = TimerEngine::default();
        engine.switch_mode(Mode::Long);
        repo.save_snapshot(&engine.snapshot());
        assert_eq!(repo.load_snapshot(), Some(engine.snapshot()));
    }

    #[test]
    fn corrupt_documents_fall_back() {
        let mut store = MemoryStore::new();
        store.set(TASKS_KEY, "{not json").unwrap();
        store.set(POURS_KEY, "[1,2]").unwrap();
        let repo = StateRepository::new(store);
        assert!(repo.load_tasks().is_empty());
        assert_eq!(repo.load_pours(), PourCounts::default());
    }

    #[test]
    fn unavailable_store_is_swallowed() {
        let mut repo = StateRepository::new(MemoryStore::unavailable());
        repo.save_budgets(&Budgets { pomodoro: 3, short: 0, long: 0 });
        assert_eq!(repo.load_budgets(), Budgets::default());
        assert!(!repo.load_break_extended());
    }

    #[test]
    fn original_layouts_parse() {
        let mut store = MemoryStore::new();
        store
            .set(
                TIMER_KEY,
                r#"{"currentMode":"short","states":{"pomodoro":{"remaining":10},"short":{"remaining":20},"long":{"remaining":30}}}"#,
            )
            .unwrap();
        store.set(BUDGETS_KEY, r#"{"pomodoro":4,"short":2,"long":1}"#).unwrap();
        let repo = StateRepository::new(store);
        let snap = repo.load_snapshot().unwrap();
        assert_eq!(snap.current_mode, Mode::Short);
        assert_eq!(snap.remaining(Mode::Long), 30);
        assert_eq!(repo.load_budgets().pomodoro, 4);
    }
}
