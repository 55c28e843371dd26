use serde::{Deserialize, Serialize};

use super::mode::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRemaining {
    pub remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStates {
    pub pomodoro: ModeRemaining,
    pub short: ModeRemaining,
    pub long: ModeRemaining,
}

/// Persisted form of the timer: the current mode and each mode's remaining
/// seconds. Durations are not stored; they come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub current_mode: Mode,
    pub states: ModeStates,
}

impl TimerSnapshot {
    pub fn remaining(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Pomodoro => self.states.pomodoro.remaining,
            Mode::Short => self.states.short.remaining,
            Mode::Long => self.states.long.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_layout() {
        let snap = TimerSnapshot {
            current_mode: Mode::Short,
            states: ModeStates {
                pomodoro: ModeRemaining { remaining: 1200 },
                short: ModeRemaining { remaining: 300 },
                long: ModeRemaining { remaining: 900 },
            },
        };
        let json = serde_json::to_value(snap).unwrap();
        assert_eq!(json["currentMode"], "short");
        assert_eq!(json["states"]["pomodoro"]["remaining"], 1200);
        assert_eq!(snap.remaining(Mode::Long), 900);
    }
}
