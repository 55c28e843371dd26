use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tally::PourBucket;
use crate::task::ItemKind;
use crate::timer::{Mode, TimerState};

/// Countdown position carried by every timer event. Visual and audio
/// adapters render from this alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerProgress {
    pub mode: Mode,
    pub remaining: u64,
    pub total: u64,
    /// Fill percentage of the bucket, 0.0 .. 100.0.
    pub percentage: f64,
}

impl TimerProgress {
    pub fn new(mode: Mode, remaining: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (total.saturating_sub(remaining) as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        };
        Self {
            mode,
            remaining,
            total,
            percentage,
        }
    }

    /// Rain volume scale for a running countdown: a floor of 0.15 that
    /// grows with the fill level.
    pub fn ambient_scale(&self) -> f64 {
        0.15 + 0.85 * (self.percentage / 100.0)
    }
}

/// Every state change in the system produces an Event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        progress: TimerProgress,
        at: DateTime<Utc>,
    },
    TimerPaused {
        progress: TimerProgress,
        at: DateTime<Utc>,
    },
    /// Countdown stopped and the current mode reset to its full duration.
    TimerStopped {
        progress: TimerProgress,
        at: DateTime<Utc>,
    },
    TimerTick {
        progress: TimerProgress,
    },
    TimerFinished {
        progress: TimerProgress,
        /// Seconds actually counted down in this cycle.
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// A start request refused by a guard; `reason` is user guidance.
    StartBlocked {
        mode: Mode,
        reason: String,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: Mode,
        to: Mode,
        progress: TimerProgress,
        at: DateTime<Utc>,
    },
    Poured {
        bucket: PourBucket,
        progress: TimerProgress,
        at: DateTime<Utc>,
    },
    BreakExtended {
        bonus_secs: u64,
        progress: TimerProgress,
        at: DateTime<Utc>,
    },
    CompletionAttributed {
        kind: ItemKind,
        id: String,
        title: String,
        completed: u32,
        /// The task was removed instead of counted.
        removed: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        progress: TimerProgress,
        clock: String,
        active_label: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "start",
            Event::TimerPaused { .. } => "pause",
            Event::TimerStopped { .. } => "stop",
            Event::TimerTick { .. } => "tick",
            Event::TimerFinished { .. } => "finished",
            Event::StartBlocked { .. } => "start_blocked",
            Event::ModeSwitched { .. } => "mode_switched",
            Event::Poured { .. } => "poured",
            Event::BreakExtended { .. } => "break_extended",
            Event::CompletionAttributed { .. } => "completion_attributed",
            Event::StateSnapshot { .. } => "snapshot",
        }
    }

    pub fn progress(&self) -> Option<&TimerProgress> {
        match self {
            Event::TimerStarted { progress, .. }
            | Event::TimerPaused { progress, .. }
            | Event::TimerStopped { progress, .. }
            | Event::TimerTick { progress }
            | Event::TimerFinished { progress, .. }
            | Event::ModeSwitched { progress, .. }
            | Event::Poured { progress, .. }
            | Event::BreakExtended { progress, .. }
            | Event::StateSnapshot { progress, .. } => Some(progress),
            Event::StartBlocked { .. } | Event::CompletionAttributed { .. } => None,
        }
    }
}

/// Receiver of emitted events (display, audio and visual adapters).
pub trait EventSink {
    fn emit(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> EventSink for F {
    fn emit(&mut self, event: &Event) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &Event) {}
}

/// Keeps every event in order; used by tests and by the CLI to print what
/// a command produced.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

/// Writes events to the tracing subscriber at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &Event) {
        match event.progress() {
            Some(p) => tracing::debug!(
                event = event.name(),
                mode = %p.mode,
                remaining = p.remaining,
                total = p.total,
                percentage = p.percentage,
            ),
            None => tracing::debug!(event = event.name()),
        }
    }
}
