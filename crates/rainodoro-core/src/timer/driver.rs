//! Countdown driver.
//!
//! The only repeating callback in the system: a tokio interval that ticks
//! the controller while its timer runs. The loop ends on its own as soon as
//! the timer leaves `Running` (finished, paused or stopped), so there is
//! never more than one live countdown for a controller.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::controller::Controller;
use crate::events::EventSink;
use crate::storage::KvStore;
use crate::timer::TimerState;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Tick `controller` once per `period` until it stops running.
///
/// Returns the state the timer settled in. A controller that is not
/// running returns immediately without scheduling anything.
pub async fn run_countdown<S, E>(controller: &mut Controller<S, E>, period: Duration) -> TimerState
where
    S: KvStore,
    E: EventSink,
{
    if !controller.is_running() {
        return controller.state();
    }
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    interval.tick().await;
    while controller.is_running() {
        interval.tick().await;
        controller.tick();
    }
    tracing::debug!(state = ?controller.state(), "countdown loop ended");
    controller.state()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::storage::{Config, MemoryStore};
    use crate::timer::Mode;

    fn short_config() -> Config {
        let mut config = Config::default();
        config.durations.short_min = 1;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn runs_until_finished() {
        let mut controller =
            Controller::load(MemoryStore::new(), RecordingSink::new(), short_config());
        controller.switch_mode(Mode::Short);
        controller.start();

        let state = run_countdown(&mut controller, TICK_PERIOD).await;

        assert_eq!(state, TimerState::Finished);
        assert_eq!(controller.remaining(), 0);
        assert_eq!(controller.sink().count("finished"), 1);
        assert_eq!(controller.sink().count("tick"), 59);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_controller_returns_immediately() {
        let mut controller =
            Controller::load(MemoryStore::new(), RecordingSink::new(), Config::default());
        let state = run_countdown(&mut controller, TICK_PERIOD).await;
        assert_eq!(state, TimerState::Ready);
        assert_eq!(controller.remaining(), 1500);
        assert_eq!(controller.sink().count("tick"), 0);
    }
}
