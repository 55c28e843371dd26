//! The single owner of timer state.
//!
//! [`Controller`] wraps the [`TimerEngine`] together with the task and
//! break lists, the per-mode selection, counters and history. It is the
//! only place that writes to the persistence port and the only emitter of
//! events, so a front end drives everything through its methods:
//! `start`, `pause`, `stop`, `tick`, `switch_mode`, `pour`, `finish_now`,
//! `extend_break` and the list operations.

use std::collections::HashMap;

use chrono::Utc;

use crate::error::{GuardViolation, Result, ValidationError};
use crate::events::{Event, EventSink, TimerProgress};
use crate::storage::{Config, KvStore, StateRepository};
use crate::tally::{Budgets, CompletionRecord, PourBucket, PourCounts, SessionHistory};
use crate::task::{BreakItem, BreakKind, BreakLists, ItemKind, Selection, Task, TaskList};
use crate::timer::{format_clock, Mode, TimerEngine, TimerState};

pub const NO_TASK_LABEL: &str = "No task selected";
pub const NO_ITEM_LABEL: &str = "No item selected";

pub struct Controller<S, E> {
    engine: TimerEngine,
    tasks: TaskList,
    breaks: BreakLists,
    selection: Selection,
    budgets: Budgets,
    pours: PourCounts,
    history: SessionHistory,
    /// Pomodoro remaining seconds parked per task id.
    task_remaining: HashMap<String, u64>,
    config: Config,
    repo: StateRepository<S>,
    sink: E,
}

impl<S: KvStore, E: EventSink> Controller<S, E> {
    /// Restore everything from `store`, falling back to defaults for any
    /// document that is missing or unreadable.
    pub fn load(store: S, sink: E, config: Config) -> Self {
        let repo = StateRepository::new(store);
        let durations = config.mode_durations();
        let engine = match repo.load_snapshot() {
            Some(snapshot) => TimerEngine::from_snapshot(
                durations,
                &snapshot,
                repo.load_break_extended(),
                config.break_bonus_secs(),
            ),
            None => TimerEngine::new(durations),
        };
        let tasks = TaskList::from_tasks(repo.load_tasks());
        let breaks = repo.load_breaks().normalized();
        let mut selection = repo.load_selection();
        let cleared = selection.retain_existing(&tasks, &breaks);
        if !cleared.is_empty() {
            tracing::debug!(?cleared, "dropped selections of deleted items");
        }
        let mut task_remaining = repo.load_task_remaining();
        task_remaining.retain(|id, _| tasks.contains(id));
        let history = SessionHistory::from_records(repo.load_history(), config.behavior.history_limit);
        let budgets = repo.load_budgets();
        let pours = repo.load_pours();

        Self {
            engine,
            tasks,
            breaks,
            selection,
            budgets,
            pours,
            history,
            task_remaining,
            config,
            repo,
            sink,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn remaining(&self) -> u64 {
        self.engine.remaining()
    }

    pub fn duration(&self) -> u64 {
        self.engine.duration()
    }

    pub fn progress(&self) -> TimerProgress {
        self.engine.progress()
    }

    /// Remaining time as `m:ss`.
    pub fn clock(&self) -> String {
        format_clock(self.engine.remaining())
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn breaks(&self) -> &BreakLists {
        &self.breaks
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    pub fn pours(&self) -> &PourCounts {
        &self.pours
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn task_remaining(&self, task_id: &str) -> Option<u64> {
        self.task_remaining.get(task_id).copied()
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    pub fn into_store(self) -> S {
        self.repo.into_inner()
    }

    /// The selected item id for `mode`, if it still exists.
    pub fn selected(&self, mode: Mode) -> Option<&str> {
        let id = self.selection.get(mode)?;
        let exists = match BreakKind::for_mode(mode) {
            None => self.tasks.contains(id),
            Some(kind) => self.breaks.contains(kind, id),
        };
        exists.then_some(id)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected(Mode::Pomodoro).and_then(|id| self.tasks.get(id))
    }

    pub fn selected_break_item(&self, kind: BreakKind) -> Option<&BreakItem> {
        self.selected(kind.mode()).and_then(|id| self.breaks.get(kind, id))
    }

    /// What the current mode is credited to, or a placeholder.
    pub fn active_label(&self) -> String {
        match BreakKind::for_mode(self.mode()) {
            None => self
                .selected_task()
                .map(|t| t.title.clone())
                .unwrap_or_else(|| NO_TASK_LABEL.to_string()),
            Some(kind) => self
                .selected_break_item(kind)
                .map(|it| it.text.clone())
                .unwrap_or_else(|| NO_ITEM_LABEL.to_string()),
        }
    }

    /// Rain volume for the audio adapter: silent unless running.
    pub fn ambient_volume(&self) -> f64 {
        if self.is_running() {
            self.progress().ambient_scale() * self.config.effective_volume()
        } else {
            0.0
        }
    }

    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            progress: self.progress(),
            clock: self.clock(),
            active_label: self.active_label(),
            at: Utc::now(),
        }
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Start or resume. A pomodoro without a selected task is refused with
    /// a `StartBlocked` event and nothing changes.
    pub fn start(&mut self) -> Option<Event> {
        if let Err(guard) = self.check_start() {
            return Some(self.refuse(guard));
        }
        let event = self.engine.start()?;
        Some(self.emit(event))
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.engine.pause()?;
        self.persist_timer();
        Some(self.emit(event))
    }

    /// Stop and refill the current mode.
    pub fn stop(&mut self) -> Option<Event> {
        let event = self.engine.stop()?;
        if self.mode() == Mode::Pomodoro {
            self.forget_selected_task_progress();
        }
        self.persist_timer();
        Some(self.emit(event))
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick()?;
        let finished = match &event {
            Event::TimerFinished { elapsed_secs, .. } => Some(*elapsed_secs),
            _ => None,
        };
        let event = self.emit(event);
        if let Some(elapsed_secs) = finished {
            self.complete(elapsed_secs);
        }
        Some(event)
    }

    /// Finish the current countdown immediately, with attribution. Subject
    /// to the same guard as `start`.
    pub fn finish_now(&mut self) -> Option<Event> {
        if self.state() == TimerState::Finished {
            return None;
        }
        if let Err(guard) = self.check_start() {
            return Some(self.refuse(guard));
        }
        let event = self.engine.finish_now()?;
        let elapsed_secs = self.engine.elapsed_secs();
        let event = self.emit(event);
        self.complete(elapsed_secs);
        Some(event)
    }

    pub fn switch_mode(&mut self, to: Mode) -> Option<Event> {
        if to == self.mode() {
            return None;
        }
        self.pause();
        let event = self.engine.switch_mode(to)?;
        self.persist_timer();
        Some(self.emit(event))
    }

    /// Empty the bucket once it is full. Counts a pour for the current
    /// mode's bucket.
    pub fn pour(&mut self) -> Option<Event> {
        let event = self.engine.pour()?;
        let bucket = self.mode().pour_bucket();
        self.pours.record(bucket);
        self.repo.save_pours(&self.pours);
        if self.mode() == Mode::Pomodoro {
            self.forget_selected_task_progress();
        }
        self.persist_timer();
        Some(self.emit(event))
    }

    pub fn extend_break(&mut self) -> Option<Event> {
        let event = self.engine.extend_break(self.config.break_bonus_secs())?;
        self.persist_timer();
        Some(self.emit(event))
    }

    /// Write every document. Called before the process goes away.
    pub fn flush(&mut self) {
        self.persist_timer();
        self.repo.save_tasks(self.tasks.as_slice());
        self.repo.save_breaks(&self.breaks);
        self.repo.save_selection(&self.selection);
        self.repo.save_task_remaining(&self.task_remaining);
        self.repo.save_budgets(&self.budgets);
        self.repo.save_pours(&self.pours);
        self.repo.save_history(&self.history.to_vec());
    }

    // ── Task list ────────────────────────────────────────────────────

    pub fn add_task(&mut self, title: &str) -> Result<Task> {
        let task = self.tasks.add(title)?.clone();
        self.repo.save_tasks(self.tasks.as_slice());
        Ok(task)
    }

    /// Delete a task. When it is the pomodoro's task and progress memory is
    /// on, its partial pomodoro goes with it: the countdown is paused and the
    /// pomodoro clock refilled.
    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.remove(id)?;
        let was_selected = self.selection.get(Mode::Pomodoro) == Some(id);
        self.on_deleted(ItemKind::Task, id);
        if was_selected && self.config.behavior.remember_task_progress {
            if self.mode() == Mode::Pomodoro {
                self.pause();
            }
            let full = self.engine.duration_of(Mode::Pomodoro);
            self.engine.load_remaining(Mode::Pomodoro, full);
            self.persist_timer();
        }
        self.repo.save_tasks(self.tasks.as_slice());
        Ok(task)
    }

    pub fn change_task_target(&mut self, id: &str, delta: i32) -> Result<u32> {
        let target = self.tasks.change_target(id, delta)?;
        self.repo.save_tasks(self.tasks.as_slice());
        Ok(target)
    }

    pub fn rename_task(&mut self, id: &str, title: &str) -> Result<()> {
        self.tasks.rename(id, title)?;
        self.repo.save_tasks(self.tasks.as_slice());
        Ok(())
    }

    pub fn move_task(&mut self, id: &str, index: usize) -> Result<()> {
        self.tasks.move_to(id, index)?;
        self.repo.save_tasks(self.tasks.as_slice());
        Ok(())
    }

    /// Make `id` the pomodoro's task (or clear the selection with `None`).
    ///
    /// With task progress memory on, a half-filled pomodoro is parked under
    /// the outgoing task and the incoming task's parked time is restored.
    pub fn select_task(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            if !self.tasks.contains(id) {
                return Err(ValidationError::UnknownTask(id.to_string()).into());
            }
        }
        let outgoing = self.selected(Mode::Pomodoro).map(str::to_string);
        if outgoing.as_deref() == id {
            return Ok(());
        }

        if self.config.behavior.remember_task_progress {
            self.swap_task_progress(outgoing.as_deref(), id);
        }

        self.selection.set(Mode::Pomodoro, id.map(str::to_string));
        self.repo.save_selection(&self.selection);
        Ok(())
    }

    // ── Break lists ──────────────────────────────────────────────────

    pub fn add_break_item(&mut self, kind: BreakKind, text: &str) -> Result<BreakItem> {
        let item = self.breaks.add(kind, text)?.clone();
        self.repo.save_breaks(&self.breaks);
        Ok(item)
    }

    pub fn delete_break_item(&mut self, kind: BreakKind, id: &str) -> Result<BreakItem> {
        let item = self.breaks.remove(kind, id)?;
        self.on_deleted(kind.into(), id);
        self.repo.save_breaks(&self.breaks);
        Ok(item)
    }

    pub fn change_break_target(&mut self, kind: BreakKind, id: &str, delta: i32) -> Result<u32> {
        let target = self.breaks.change_target(kind, id, delta)?;
        self.repo.save_breaks(&self.breaks);
        Ok(target)
    }

    pub fn select_break_item(&mut self, kind: BreakKind, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            if !self.breaks.contains(kind, id) {
                return Err(ValidationError::UnknownBreakItem(id.to_string()).into());
            }
        }
        self.selection.set(kind.mode(), id.map(str::to_string));
        self.repo.save_selection(&self.selection);
        Ok(())
    }

    // ── Counters ─────────────────────────────────────────────────────

    pub fn increment_budget(&mut self, mode: Mode) -> u32 {
        let value = self.budgets.increment(mode);
        self.repo.save_budgets(&self.budgets);
        value
    }

    pub fn decrement_budget(&mut self, mode: Mode) -> u32 {
        let value = self.budgets.decrement(mode);
        self.repo.save_budgets(&self.budgets);
        value
    }

    pub fn reset_pours(&mut self, bucket: PourBucket) {
        self.pours.reset(bucket);
        self.repo.save_pours(&self.pours);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.repo.save_history(&[]);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn emit(&mut self, event: Event) -> Event {
        if !matches!(event, Event::TimerTick { .. }) {
            tracing::debug!(event = event.name(), mode = %self.mode(), remaining = self.remaining());
        }
        self.sink.emit(&event);
        event
    }

    fn refuse(&mut self, guard: GuardViolation) -> Event {
        tracing::debug!(mode = %self.mode(), %guard, "start blocked");
        self.emit(Event::StartBlocked {
            mode: self.mode(),
            reason: guard.to_string(),
            at: Utc::now(),
        })
    }

    fn check_start(&self) -> Result<(), GuardViolation> {
        if self.mode() == Mode::Pomodoro
            && self.config.behavior.require_task_for_pomodoro
            && self.selected_task().is_none()
            && !self.is_running()
        {
            return Err(GuardViolation::NoTaskSelected);
        }
        Ok(())
    }

    fn persist_timer(&mut self) {
        self.repo.save_snapshot(&self.engine.snapshot());
        self.repo.save_break_extended(self.engine.break_extended());
    }

    /// Completion attribution for the countdown that just finished.
    fn complete(&mut self, elapsed_secs: u64) {
        let mode = self.mode();
        let selected = self.selected(mode).map(str::to_string);
        let mut title = None;

        if let Some(id) = selected.as_deref() {
            let attributed = match BreakKind::for_mode(mode) {
                None => self.credit_task(id),
                Some(kind) => self.credit_break_item(kind, id),
            };
            if let Some(event) = attributed {
                if let Event::CompletionAttributed { title: t, .. } = &event {
                    title = Some(t.clone());
                }
                self.emit(event);
            }
        }

        self.history.push(CompletionRecord {
            mode,
            item_id: selected,
            title,
            elapsed_secs,
            completed_at: Utc::now(),
        });
        self.repo.save_history(&self.history.to_vec());

        if self.config.behavior.auto_advance {
            if let Some(event) = self.engine.advance() {
                self.emit(event);
            }
        }
        self.persist_timer();
    }

    fn credit_task(&mut self, id: &str) -> Option<Event> {
        let task = self.tasks.get(id)?.clone();
        let (completed, removed) = if self.config.behavior.delete_task_on_complete {
            self.tasks.remove(id).ok()?;
            self.selection.clear_id(ItemKind::Task, id);
            self.repo.save_selection(&self.selection);
            (task.completed.saturating_add(1), true)
        } else {
            (self.tasks.increment_completed(id).ok()?, false)
        };
        if self.task_remaining.remove(id).is_some() {
            self.repo.save_task_remaining(&self.task_remaining);
        }
        self.repo.save_tasks(self.tasks.as_slice());
        tracing::info!(task = %task.title, completed, removed, "pomodoro credited");
        Some(Event::CompletionAttributed {
            kind: ItemKind::Task,
            id: id.to_string(),
            title: task.title,
            completed,
            removed,
            at: Utc::now(),
        })
    }

    fn credit_break_item(&mut self, kind: BreakKind, id: &str) -> Option<Event> {
        let completed = self.breaks.increment_completed(kind, id).ok()?;
        let text = self.breaks.get(kind, id)?.text.clone();
        self.repo.save_breaks(&self.breaks);
        tracing::info!(item = %text, completed, "break credited");
        Some(Event::CompletionAttributed {
            kind: kind.into(),
            id: id.to_string(),
            title: text,
            completed,
            removed: false,
            at: Utc::now(),
        })
    }

    /// Clear matching selection and parked progress after a delete.
    fn on_deleted(&mut self, kind: ItemKind, id: &str) {
        if self.selection.clear_id(kind, id) {
            self.repo.save_selection(&self.selection);
        }
        if kind == ItemKind::Task && self.task_remaining.remove(id).is_some() {
            self.repo.save_task_remaining(&self.task_remaining);
        }
    }

    fn forget_selected_task_progress(&mut self) {
        let Some(id) = self.selected(Mode::Pomodoro).map(str::to_string) else {
            return;
        };
        if self.task_remaining.remove(&id).is_some() {
            self.repo.save_task_remaining(&self.task_remaining);
        }
    }

    fn swap_task_progress(&mut self, outgoing: Option<&str>, incoming: Option<&str>) {
        let remaining = self.engine.remaining_of(Mode::Pomodoro);
        let duration = self.engine.duration_of(Mode::Pomodoro);
        let mid_countdown = remaining > 0 && remaining < duration;

        let mut parked = false;
        if let (Some(out), true) = (outgoing, mid_countdown) {
            self.task_remaining.insert(out.to_string(), remaining);
            parked = true;
        }
        let restored = incoming.and_then(|id| self.task_remaining.remove(id));

        if parked || restored.is_some() {
            if self.mode() == Mode::Pomodoro {
                self.pause();
            }
            self.engine
                .load_remaining(Mode::Pomodoro, restored.unwrap_or(duration));
            self.repo.save_task_remaining(&self.task_remaining);
            self.persist_timer();
        }
    }
}
