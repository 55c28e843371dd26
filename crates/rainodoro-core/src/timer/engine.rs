//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine over three modes. It does
//! not own a clock or a thread: the caller invokes `tick()` once per second
//! while the engine is running (see [`super::driver`]).
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> Running -> (Paused | Finished)
//! Paused -> Running
//! Finished --pour--> Ready
//! any --stop--> Ready
//! any --switch_mode--> Ready (new mode)
//! ```
//!
//! Each mode keeps its own remaining time, so switching away from a
//! half-filled pomodoro and back resumes where it left off.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(ModeDurations::default());
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::TimerFinished { .. }) when the bucket is full
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{Mode, ModeDurations};
use super::snapshot::{ModeRemaining, ModeStates, TimerSnapshot};
use crate::events::{Event, TimerProgress};

/// Fill percentage from which pouring is allowed before the clock hits zero.
const POUR_THRESHOLD_PCT: u64 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Ready,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ModeClock {
    duration: u64,
    remaining: u64,
}

impl ModeClock {
    fn full(duration: u64) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    durations: ModeDurations,
    current: Mode,
    clocks: [ModeClock; 3],
    state: TimerState,
    /// Seconds ticked since the current countdown last began from full.
    elapsed_secs: u64,
    /// Short break carries a one-time bonus.
    break_extended: bool,
}

fn slot(mode: Mode) -> usize {
    match mode {
        Mode::Pomodoro => 0,
        Mode::Short => 1,
        Mode::Long => 2,
    }
}

impl TimerEngine {
    /// Create a new engine in pomodoro mode with every clock full.
    pub fn new(durations: ModeDurations) -> Self {
        Self {
            durations,
            current: Mode::Pomodoro,
            clocks: [
                ModeClock::full(durations.pomodoro),
                ModeClock::full(durations.short),
                ModeClock::full(durations.long),
            ],
            state: TimerState::Ready,
            elapsed_secs: 0,
            break_extended: false,
        }
    }

    /// Rebuild an engine from a persisted snapshot.
    ///
    /// Remaining values larger than the mode's duration are clamped. When
    /// `break_extended` is set the short break keeps its bonus.
    pub fn from_snapshot(
        durations: ModeDurations,
        snapshot: &TimerSnapshot,
        break_extended: bool,
        bonus_secs: u64,
    ) -> Self {
        let mut engine = Self::new(durations);
        engine.break_extended = break_extended;
        if break_extended {
            engine.clocks[slot(Mode::Short)].duration =
                durations.short.saturating_add(bonus_secs);
        }
        for mode in Mode::ALL {
            let clock = &mut engine.clocks[slot(mode)];
            clock.remaining = snapshot.remaining(mode).min(clock.duration);
        }
        engine.current = snapshot.current_mode;
        engine.elapsed_secs = engine.duration().saturating_sub(engine.remaining());
        engine.state = engine.resting_state();
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining(&self) -> u64 {
        self.clock().remaining
    }

    pub fn duration(&self) -> u64 {
        self.clock().duration
    }

    pub fn remaining_of(&self, mode: Mode) -> u64 {
        self.clocks[slot(mode)].remaining
    }

    pub fn duration_of(&self, mode: Mode) -> u64 {
        self.clocks[slot(mode)].duration
    }

    pub fn durations(&self) -> ModeDurations {
        self.durations
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn break_extended(&self) -> bool {
        self.break_extended
    }

    pub fn progress(&self) -> TimerProgress {
        TimerProgress::new(self.current, self.remaining(), self.duration())
    }

    /// The bucket is full enough to pour.
    pub fn can_pour(&self) -> bool {
        let filled = self.duration().saturating_sub(self.remaining());
        self.remaining() == 0
            || filled.saturating_mul(100) >= self.duration().saturating_mul(POUR_THRESHOLD_PCT)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let remaining = |mode| ModeRemaining {
            remaining: self.remaining_of(mode),
        };
        TimerSnapshot {
            current_mode: self.current,
            states: ModeStates {
                pomodoro: remaining(Mode::Pomodoro),
                short: remaining(Mode::Short),
                long: remaining(Mode::Long),
            },
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume the countdown. No-op while running or finished.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Ready | TimerState::Paused => {
                self.state = TimerState::Running;
                Some(Event::TimerStarted {
                    progress: self.progress(),
                    at: Utc::now(),
                })
            }
            TimerState::Running | TimerState::Finished => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    progress: self.progress(),
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Stop and refill the current mode's clock.
    pub fn stop(&mut self) -> Option<Event> {
        self.refill(self.current);
        self.state = TimerState::Ready;
        Some(Event::TimerStopped {
            progress: self.progress(),
            at: Utc::now(),
        })
    }

    /// Call once per second. Returns `TimerFinished` exactly once, on the
    /// tick that brings the clock to zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        let clock = &mut self.clocks[slot(self.current)];
        if clock.remaining > 0 {
            clock.remaining -= 1;
            self.elapsed_secs += 1;
        }
        if clock.remaining == 0 {
            return Some(self.finish());
        }
        Some(Event::TimerTick {
            progress: self.progress(),
        })
    }

    /// Drain the clock and finish immediately.
    pub fn finish_now(&mut self) -> Option<Event> {
        if self.state == TimerState::Finished {
            return None;
        }
        self.clocks[slot(self.current)].remaining = 0;
        Some(self.finish())
    }

    /// Switch to another mode, pausing a running countdown. The outgoing
    /// mode keeps its remaining time.
    pub fn switch_mode(&mut self, to: Mode) -> Option<Event> {
        if to == self.current {
            return None;
        }
        let from = self.current;
        self.current = to;
        if to == Mode::Short && self.break_extended {
            self.clear_break_bonus();
        }
        self.elapsed_secs = self.duration().saturating_sub(self.remaining());
        self.state = self.resting_state();
        Some(Event::ModeSwitched {
            from,
            to,
            progress: self.progress(),
            at: Utc::now(),
        })
    }

    /// Empty a full (or nearly full) bucket, refilling the clock.
    pub fn pour(&mut self) -> Option<Event> {
        if !self.can_pour() {
            return None;
        }
        self.refill(self.current);
        self.state = TimerState::Ready;
        Some(Event::Poured {
            bucket: self.current.pour_bucket(),
            progress: self.progress(),
            at: Utc::now(),
        })
    }

    /// Add `bonus_secs` to the short break, once per break cycle. A break
    /// that already finished has been credited and cannot be extended.
    pub fn extend_break(&mut self, bonus_secs: u64) -> Option<Event> {
        if self.current != Mode::Short
            || self.break_extended
            || self.state == TimerState::Finished
        {
            return None;
        }
        let clock = &mut self.clocks[slot(Mode::Short)];
        clock.duration = clock.duration.saturating_add(bonus_secs);
        clock.remaining = clock.remaining.saturating_add(bonus_secs);
        self.break_extended = true;
        Some(Event::BreakExtended {
            bonus_secs,
            progress: self.progress(),
            at: Utc::now(),
        })
    }

    /// Overwrite a mode's remaining time, clamped to its duration. Running
    /// countdowns are left alone; resting ones settle to Ready or Finished.
    pub fn load_remaining(&mut self, mode: Mode, remaining: u64) {
        let clock = &mut self.clocks[slot(mode)];
        clock.remaining = remaining.min(clock.duration);
        if mode == self.current && self.state != TimerState::Running {
            self.elapsed_secs = self.duration().saturating_sub(self.remaining());
            self.state = self.resting_state();
        }
    }

    /// Refill the finished mode and move to the one that follows it.
    pub fn advance(&mut self) -> Option<Event> {
        if self.state != TimerState::Finished {
            return None;
        }
        let finished = self.current;
        self.refill(finished);
        self.switch_mode(finished.next())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn clock(&self) -> &ModeClock {
        &self.clocks[slot(self.current)]
    }

    fn finish(&mut self) -> Event {
        self.state = TimerState::Finished;
        Event::TimerFinished {
            progress: self.progress(),
            elapsed_secs: self.elapsed_secs,
            at: Utc::now(),
        }
    }

    fn refill(&mut self, mode: Mode) {
        let clock = &mut self.clocks[slot(mode)];
        clock.remaining = clock.duration;
        if mode == self.current {
            self.elapsed_secs = 0;
        }
    }

    fn clear_break_bonus(&mut self) {
        let nominal = self.durations.short;
        let clock = &mut self.clocks[slot(Mode::Short)];
        clock.duration = nominal;
        clock.remaining = clock.remaining.min(nominal);
        self.break_extended = false;
    }

    fn resting_state(&self) -> TimerState {
        if self.remaining() == 0 {
            TimerState::Finished
        } else {
            TimerState::Ready
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(ModeDurations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> TimerEngine {
        TimerEngine::new(ModeDurations {
            pomodoro: 3,
            short: 2,
            long: 4,
        })
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.state(), TimerState::Ready);

        assert!(engine.start().is_some());
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert!(engine.pause().is_none());

        assert!(engine.start().is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn ticks_only_count_while_running() {
        let mut engine = TimerEngine::default();
        assert!(engine.tick().is_none());
        engine.start();
        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.remaining(), 1490);
        engine.pause();
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining(), 1490);
    }

    #[test]
    fn finish_fires_once() {
        let mut engine = tiny();
        engine.start();
        assert!(matches!(engine.tick(), Some(Event::TimerTick { .. })));
        assert!(matches!(engine.tick(), Some(Event::TimerTick { .. })));
        match engine.tick() {
            Some(Event::TimerFinished { elapsed_secs, progress, .. }) => {
                assert_eq!(elapsed_secs, 3);
                assert_eq!(progress.remaining, 0);
            }
            other => panic!("expected TimerFinished, got {other:?}"),
        }
        assert_eq!(engine.state(), TimerState::Finished);
        assert!(engine.tick().is_none());
        assert!(engine.finish_now().is_none());
        assert!(engine.start().is_none());
        assert_eq!(engine.remaining(), 0);
    }

    #[test]
    fn stop_refills_current_mode() {
        let mut engine = tiny();
        engine.start();
        engine.tick();
        engine.stop();
        assert_eq!(engine.state(), TimerState::Ready);
        assert_eq!(engine.remaining(), 3);
        assert_eq!(engine.elapsed_secs(), 0);
    }

    #[test]
    fn switch_mode_preserves_each_clock() {
        let mut engine = tiny();
        engine.start();
        engine.tick();
        let event = engine.switch_mode(Mode::Long);
        assert!(matches!(event, Some(Event::ModeSwitched { from: Mode::Pomodoro, to: Mode::Long, .. })));
        assert_eq!(engine.state(), TimerState::Ready);
        assert_eq!(engine.remaining(), 4);
        assert!(engine.switch_mode(Mode::Long).is_none());

        engine.switch_mode(Mode::Pomodoro);
        assert_eq!(engine.remaining(), 2);
        assert_eq!(engine.elapsed_secs(), 1);
    }

    #[test]
    fn switching_to_a_drained_mode_lands_in_finished() {
        let mut engine = tiny();
        engine.finish_now();
        engine.switch_mode(Mode::Short);
        engine.switch_mode(Mode::Pomodoro);
        assert_eq!(engine.state(), TimerState::Finished);
        assert!(engine.can_pour());
    }

    #[test]
    fn pour_requires_a_full_bucket() {
        let mut engine = TimerEngine::default();
        assert!(engine.pour().is_none());
        engine.finish_now();
        match engine.pour() {
            Some(Event::Poured { bucket, .. }) => assert_eq!(bucket, crate::tally::PourBucket::Pomodoro),
            other => panic!("expected Poured, got {other:?}"),
        }
        assert_eq!(engine.remaining(), 1500);
        assert_eq!(engine.state(), TimerState::Ready);
    }

    #[test]
    fn pour_allowed_at_ninety_nine_percent() {
        let mut engine = TimerEngine::default();
        engine.load_remaining(Mode::Pomodoro, 15);
        assert!(engine.can_pour());
        engine.load_remaining(Mode::Pomodoro, 16);
        assert!(!engine.can_pour());
    }

    #[test]
    fn extend_break_once_per_cycle() {
        let mut engine = TimerEngine::default();
        assert!(engine.extend_break(600).is_none());
        engine.switch_mode(Mode::Short);
        assert!(engine.extend_break(600).is_some());
        assert_eq!(engine.duration(), 900);
        assert_eq!(engine.remaining(), 900);
        assert!(engine.extend_break(600).is_none());

        engine.switch_mode(Mode::Pomodoro);
        assert_eq!(engine.duration_of(Mode::Short), 900);
        engine.switch_mode(Mode::Short);
        assert_eq!(engine.duration(), 300);
        assert_eq!(engine.remaining(), 300);
        assert!(!engine.break_extended());
    }

    #[test]
    fn finished_break_cannot_be_extended() {
        let mut engine = TimerEngine::default();
        engine.switch_mode(Mode::Short);
        engine.start();
        engine.finish_now();
        assert!(engine.extend_break(600).is_none());
        assert_eq!(engine.state(), TimerState::Finished);
        assert_eq!(engine.duration(), 300);
        assert!(!engine.break_extended());
    }

    #[test]
    fn restored_engine_counts_elapsed_from_snapshot() {
        let mut engine = TimerEngine::default();
        engine.start();
        for _ in 0..40 {
            engine.tick();
        }
        engine.pause();

        let mut restored = TimerEngine::from_snapshot(
            ModeDurations::default(),
            &engine.snapshot(),
            false,
            600,
        );
        assert_eq!(restored.elapsed_secs(), 40);
        restored.start();
        match restored.finish_now() {
            Some(Event::TimerFinished { elapsed_secs, .. }) => assert_eq!(elapsed_secs, 40),
            other => panic!("expected TimerFinished, got {other:?}"),
        }
    }

    #[test]
    fn advance_moves_to_next_mode() {
        let mut engine = tiny();
        assert!(engine.advance().is_none());
        engine.finish_now();
        engine.advance();
        assert_eq!(engine.mode(), Mode::Short);
        assert_eq!(engine.state(), TimerState::Ready);
        assert_eq!(engine.remaining_of(Mode::Pomodoro), 3);
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut engine = TimerEngine::default();
        engine.start();
        engine.tick();
        engine.switch_mode(Mode::Long);
        let snap = engine.snapshot();
        let restored = TimerEngine::from_snapshot(ModeDurations::default(), &snap, false, 600);
        assert_eq!(restored.snapshot(), snap);
        assert_eq!(restored.mode(), Mode::Long);
        assert_eq!(restored.remaining_of(Mode::Pomodoro), 1499);
    }

    #[test]
    fn from_snapshot_clamps_and_keeps_bonus() {
        let snap = TimerSnapshot {
            current_mode: Mode::Short,
            states: ModeStates {
                pomodoro: ModeRemaining { remaining: 99_999 },
                short: ModeRemaining { remaining: 800 },
                long: ModeRemaining { remaining: 0 },
            },
        };
        let engine = TimerEngine::from_snapshot(ModeDurations::default(), &snap, true, 600);
        assert_eq!(engine.remaining_of(Mode::Pomodoro), 1500);
        assert_eq!(engine.duration(), 900);
        assert_eq!(engine.remaining(), 800);
        assert!(engine.break_extended());
    }
}
