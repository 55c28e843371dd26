pub mod driver;
mod engine;
mod mode;
mod snapshot;

pub use driver::{run_countdown, TICK_PERIOD};
pub use engine::{TimerEngine, TimerState};
pub use mode::{format_clock, Mode, ModeDurations};
pub use snapshot::{ModeRemaining, ModeStates, TimerSnapshot};
