use serde::{Deserialize, Serialize};

use crate::tally::PourBucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Pomodoro,
    Short,
    Long,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Pomodoro, Mode::Short, Mode::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Pomodoro => "pomodoro",
            Mode::Short => "short",
            Mode::Long => "long",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Mode::Pomodoro)
    }

    pub fn pour_bucket(&self) -> PourBucket {
        match self {
            Mode::Pomodoro => PourBucket::Pomodoro,
            Mode::Short | Mode::Long => PourBucket::Break,
        }
    }

    /// Mode entered automatically after this one finishes.
    pub fn next(&self) -> Mode {
        match self {
            Mode::Pomodoro => Mode::Short,
            Mode::Short | Mode::Long => Mode::Pomodoro,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" | "focus" => Ok(Mode::Pomodoro),
            "short" | "short-break" => Ok(Mode::Short),
            "long" | "long-break" => Ok(Mode::Long),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Nominal duration of each mode, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDurations {
    pub pomodoro: u64,
    pub short: u64,
    pub long: u64,
}

impl ModeDurations {
    pub fn from_minutes(pomodoro: u64, short: u64, long: u64) -> Self {
        Self {
            pomodoro: pomodoro.saturating_mul(60),
            short: short.saturating_mul(60),
            long: long.saturating_mul(60),
        }
    }

    pub fn get(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Pomodoro => self.pomodoro,
            Mode::Short => self.short,
            Mode::Long => self.long,
        }
    }
}

impl Default for ModeDurations {
    fn default() -> Self {
        Self::from_minutes(25, 5, 15)
    }
}

/// Render seconds as `m:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_durations() {
        let d = ModeDurations::default();
        assert_eq!(d.get(Mode::Pomodoro), 1500);
        assert_eq!(d.get(Mode::Short), 300);
        assert_eq!(d.get(Mode::Long), 900);
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(1490), "24:50");
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(61), "1:01");
    }

    #[test]
    fn mode_parsing_and_buckets() {
        assert_eq!("Short".parse::<Mode>().unwrap(), Mode::Short);
        assert!("nap".parse::<Mode>().is_err());
        assert_eq!(Mode::Long.pour_bucket(), PourBucket::Break);
        assert_eq!(Mode::Pomodoro.next(), Mode::Short);
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Pomodoro).unwrap(), "\"pomodoro\"");
    }
}
