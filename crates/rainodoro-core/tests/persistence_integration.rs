//! Integration tests for the SQLite-backed store.
//!
//! Each test opens a database in a temp dir, drives a controller, drops it
//! and reopens the file as a fresh process would.

use rainodoro_core::storage::state::{SELECTION_KEY, TIMER_KEY};
use rainodoro_core::{
    BreakKind, Config, Controller, Database, KvStore, Mode, NullSink, TimerState,
};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Database {
    Database::open_at(&dir.path().join("rainodoro.db")).unwrap()
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let (task_id, item_id) = {
        let mut c = Controller::load(open(&dir), NullSink, Config::default());
        let task = c.add_task("Refactor parser").unwrap();
        c.change_task_target(&task.id, 2).unwrap();
        c.select_task(Some(&task.id)).unwrap();
        let item = c.add_break_item(BreakKind::Long, "walk outside").unwrap();
        c.select_break_item(BreakKind::Long, Some(&item.id)).unwrap();
        c.increment_budget(Mode::Short);

        c.start();
        c.finish_now();
        c.pour();
        c.start();
        for _ in 0..90 {
            c.tick();
        }
        c.pause();
        c.flush();
        (task.id, item.id)
    };

    let c = Controller::load(open(&dir), NullSink, Config::default());
    let task = c.tasks().get(&task_id).unwrap();
    assert_eq!(task.target, 3);
    assert_eq!(task.completed, 1);
    assert_eq!(c.selection().get(Mode::Pomodoro), Some(task_id.as_str()));
    assert_eq!(c.selection().get(Mode::Long), Some(item_id.as_str()));
    assert_eq!(c.budgets().short, 1);
    assert_eq!(c.pours().pomodoro, 1);
    assert_eq!(c.history().len(), 1);
    assert_eq!(c.mode(), Mode::Pomodoro);
    assert_eq!(c.remaining(), 1410);
    assert_eq!(c.state(), TimerState::Ready);
}

#[test]
fn test_break_bonus_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut c = Controller::load(open(&dir), NullSink, Config::default());
        c.switch_mode(Mode::Short);
        c.extend_break();
    }
    let mut c = Controller::load(open(&dir), NullSink, Config::default());
    assert_eq!(c.mode(), Mode::Short);
    assert_eq!(c.duration(), 900);
    assert_eq!(c.remaining(), 900);
    assert!(c.extend_break().is_none());
}

#[test]
fn test_corrupt_documents_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    {
        let mut db = open(&dir);
        db.set(TIMER_KEY, "{not json").unwrap();
        db.set(SELECTION_KEY, r#"{"pomodoro":"ghost"}"#).unwrap();
    }
    let c = Controller::load(open(&dir), NullSink, Config::default());
    assert_eq!(c.mode(), Mode::Pomodoro);
    assert_eq!(c.remaining(), 1500);
    assert_eq!(c.selection().get(Mode::Pomodoro), None);
}

#[test]
fn test_oversized_remaining_is_clamped() {
    let dir = TempDir::new().unwrap();
    {
        let mut db = open(&dir);
        db.set(
            TIMER_KEY,
            r#"{"currentMode":"short","states":{"pomodoro":{"remaining":99999},"short":{"remaining":120},"long":{"remaining":900}}}"#,
        )
        .unwrap();
    }
    let c = Controller::load(open(&dir), NullSink, Config::default());
    assert_eq!(c.mode(), Mode::Short);
    assert_eq!(c.remaining(), 120);
    assert_eq!(c.engine().remaining_of(Mode::Pomodoro), 1500);
}

#[test]
fn test_elapsed_time_spans_reopen() {
    let dir = TempDir::new().unwrap();
    let task_id = {
        let mut c = Controller::load(open(&dir), NullSink, Config::default());
        let task = c.add_task("Long read").unwrap();
        c.select_task(Some(&task.id)).unwrap();
        c.start();
        for _ in 0..1400 {
            c.tick();
        }
        c.pause();
        task.id
    };

    let mut c = Controller::load(open(&dir), NullSink, Config::default());
    assert_eq!(c.remaining(), 100);
    c.start();
    while c.is_running() {
        c.tick();
    }

    let record = c.history().iter().last().unwrap();
    assert_eq!(record.item_id.as_deref(), Some(task_id.as_str()));
    assert_eq!(record.elapsed_secs, 1500);
}
