//! Counters kept alongside the timer: daily budgets, pour counts and the
//! completion history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// User-set counters per mode. Never consumed by the timer itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    #[serde(default)]
    pub pomodoro: u32,
    #[serde(default)]
    pub short: u32,
    #[serde(default)]
    pub long: u32,
}

impl Budgets {
    pub fn get(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Pomodoro => self.pomodoro,
            Mode::Short => self.short,
            Mode::Long => self.long,
        }
    }

    fn slot_mut(&mut self, mode: Mode) -> &mut u32 {
        match mode {
            Mode::Pomodoro => &mut self.pomodoro,
            Mode::Short => &mut self.short,
            Mode::Long => &mut self.long,
        }
    }

    pub fn increment(&mut self, mode: Mode) -> u32 {
        let slot = self.slot_mut(mode);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Decrement, stopping at zero.
    pub fn decrement(&mut self, mode: Mode) -> u32 {
        let slot = self.slot_mut(mode);
        *slot = slot.saturating_sub(1);
        *slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PourBucket {
    Pomodoro,
    Break,
}

impl std::str::FromStr for PourBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" => Ok(PourBucket::Pomodoro),
            "break" => Ok(PourBucket::Break),
            other => Err(format!("unknown pour bucket: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PourCounts {
    #[serde(default)]
    pub pomodoro: u32,
    #[serde(default, rename = "break")]
    pub break_: u32,
}

impl PourCounts {
    pub fn get(&self, bucket: PourBucket) -> u32 {
        match bucket {
            PourBucket::Pomodoro => self.pomodoro,
            PourBucket::Break => self.break_,
        }
    }

    pub fn record(&mut self, bucket: PourBucket) -> u32 {
        let slot = match bucket {
            PourBucket::Pomodoro => &mut self.pomodoro,
            PourBucket::Break => &mut self.break_,
        };
        *slot = slot.saturating_add(1);
        *slot
    }

    pub fn reset(&mut self, bucket: PourBucket) {
        match bucket {
            PourBucket::Pomodoro => self.pomodoro = 0,
            PourBucket::Break => self.break_ = 0,
        }
    }
}

/// One finished countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub mode: Mode,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub elapsed_secs: u64,
    pub completed_at: DateTime<Utc>,
}

/// Completion log, oldest first, capped at `limit` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHistory {
    records: VecDeque<CompletionRecord>,
    limit: usize,
}

pub const DEFAULT_HISTORY_LIMIT: usize = 200;

impl SessionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    pub fn from_records(records: Vec<CompletionRecord>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for record in records {
            history.push(record);
        }
        history
    }

    pub fn push(&mut self, record: CompletionRecord) {
        self.records.push_back(record);
        while self.records.len() > self.limit {
            self.records.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn to_vec(&self) -> Vec<CompletionRecord> {
        self.records.iter().cloned().collect()
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
