use std::time::Duration;

use clap::Subcommand;
use rainodoro_core::timer::{run_countdown, TICK_PERIOD};
use rainodoro_core::{Event, Mode, TimerState};
use serde_json::json;

use super::{open_controller, print_json, CliController, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown and run it in the foreground.
    /// Ctrl-C pauses and saves.
    Start {
        /// Don't draw the live clock on stderr
        #[arg(long)]
        quiet: bool,
        /// Tick period in milliseconds
        #[arg(long, default_value_t = TICK_PERIOD.as_millis() as u64, hide = true)]
        tick_ms: u64,
    },
    /// Pause the countdown
    Pause,
    /// Stop and refill the current mode
    Stop,
    /// Empty a full bucket
    Pour,
    /// Finish the current countdown now
    Finish,
    /// Add the bonus minutes to the short break (once)
    Extend,
    /// Switch mode (pomodoro, short, long)
    Mode {
        mode: Mode,
    },
    /// Print current timer state as JSON
    Status,
}

fn status(controller: &CliController) -> serde_json::Value {
    let progress = controller.progress();
    json!({
        "state": controller.state(),
        "mode": controller.mode(),
        "clock": controller.clock(),
        "remaining": progress.remaining,
        "duration": progress.total,
        "percentage": progress.percentage,
        "active": controller.active_label(),
        "can_pour": controller.engine().can_pour(),
        "break_extended": controller.engine().break_extended(),
    })
}

fn run_foreground(controller: &mut CliController, period: Duration) -> CliResult<TimerState> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let interrupted = runtime.block_on(async {
        tokio::select! {
            _ = run_countdown(controller, period) => false,
            _ = tokio::signal::ctrl_c() => true,
        }
    });
    eprintln!();
    if interrupted {
        tracing::info!("interrupted, pausing");
        controller.pause();
    }
    controller.flush();
    Ok(controller.state())
}

pub fn run(action: TimerAction) -> CliResult {
    let show_ticks = matches!(action, TimerAction::Start { quiet: false, .. });
    let mut controller = open_controller(show_ticks)?;

    match action {
        TimerAction::Start { tick_ms, .. } => {
            if let Some(Event::StartBlocked { reason, .. }) = controller.start() {
                return Err(reason.into());
            }
            if !controller.is_running() {
                return Err(format!("nothing to start: timer is {:?}, pour or stop first", controller.state()).into());
            }
            run_foreground(&mut controller, Duration::from_millis(tick_ms.max(1)))?;
        }
        TimerAction::Pause => {
            controller.pause();
        }
        TimerAction::Stop => {
            controller.stop();
        }
        TimerAction::Pour => {
            if controller.pour().is_none() {
                return Err(format!("the bucket is not full yet ({})", controller.clock()).into());
            }
        }
        TimerAction::Finish => {
            if let Some(Event::StartBlocked { reason, .. }) = controller.finish_now() {
                return Err(reason.into());
            }
        }
        TimerAction::Extend => {
            if controller.extend_break().is_none() {
                return Err("only a short break can be extended, once".into());
            }
        }
        TimerAction::Mode { mode } => {
            controller.switch_mode(mode);
        }
        TimerAction::Status => {}
    }

    print_json(&status(&controller))
}
