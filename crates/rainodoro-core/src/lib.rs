//! # Rainodoro Core Library
//!
//! This library provides the core business logic for the Rainodoro timer:
//! a Pomodoro countdown rendered as a bucket slowly filling with rain.
//! Every operation is available through the standalone CLI binary; any
//! richer front end is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine over three modes
//!   (pomodoro, short break, long break), each with its own remaining time
//! - **Controller**: Owns the engine, task and break lists, selections and
//!   counters, and runs completion attribution
//! - **Storage**: A key-value persistence port with SQLite and in-memory
//!   adapters, plus TOML-based configuration
//! - **Events**: Every state change produces an [`Event`] delivered to an
//!   injected [`EventSink`]
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Controller`]: The single owner of all timer state
//! - [`KvStore`]: Persistence port
//! - [`Config`]: Application configuration management

pub mod controller;
pub mod error;
pub mod events;
pub mod storage;
pub mod tally;
pub mod task;
pub mod timer;

pub use controller::Controller;
pub use error::{ConfigError, CoreError, GuardViolation, StorageError, ValidationError};
pub use events::{Event, EventSink, NullSink, RecordingSink, TimerProgress, TracingSink};
pub use storage::{Config, Database, KvStore, MemoryStore, StateRepository};
pub use tally::{Budgets, CompletionRecord, PourBucket, PourCounts, SessionHistory};
pub use task::{BreakItem, BreakKind, BreakLists, ItemKind, Selection, Task, TaskList};
pub use timer::{format_clock, Mode, ModeDurations, TimerEngine, TimerSnapshot, TimerState};
