//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Mode durations
//! - Timer behavior (start guard, auto-advance, completion handling)
//! - Ambient rain volume
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::tally::DEFAULT_HISTORY_LIMIT;
use crate::timer::ModeDurations;

/// Mode durations in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationsConfig {
    #[serde(default = "default_pomodoro_min")]
    pub pomodoro_min: u64,
    #[serde(default = "default_short_min")]
    pub short_min: u64,
    #[serde(default = "default_long_min")]
    pub long_min: u64,
}

/// Timer behavior switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// A pomodoro cannot start without a selected task.
    #[serde(default = "default_true")]
    pub require_task_for_pomodoro: bool,
    /// After a countdown finishes, refill it and move to the next mode
    /// instead of waiting for a pour.
    #[serde(default)]
    pub auto_advance: bool,
    /// Remove a task when its pomodoro completes instead of counting it.
    #[serde(default)]
    pub delete_task_on_complete: bool,
    /// Keep a separate pomodoro remaining time per task.
    #[serde(default = "default_true")]
    pub remember_task_progress: bool,
    #[serde(default = "default_break_bonus_min")]
    pub break_bonus_min: u64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Ambient rain settings, consumed by audio adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_master_volume")]
    pub master_volume: f64,
    #[serde(default)]
    pub muted: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub durations: DurationsConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

// Default functions
fn default_pomodoro_min() -> u64 {
    25
}
fn default_short_min() -> u64 {
    5
}
fn default_long_min() -> u64 {
    15
}
fn default_true() -> bool {
    true
}
fn default_break_bonus_min() -> u64 {
    10
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
fn default_master_volume() -> f64 {
    0.18
}

impl Default for DurationsConfig {
    fn default() -> Self {
        Self {
            pomodoro_min: default_pomodoro_min(),
            short_min: default_short_min(),
            long_min: default_long_min(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            require_task_for_pomodoro: true,
            auto_advance: false,
            delete_task_on_complete: false,
            remember_task_progress: true,
            break_bonus_min: default_break_bonus_min(),
            history_limit: default_history_limit(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: default_master_volume(),
            muted: false,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn mode_durations(&self) -> ModeDurations {
        ModeDurations::from_minutes(
            self.durations.pomodoro_min,
            self.durations.short_min,
            self.durations.long_min,
        )
    }

    pub fn break_bonus_secs(&self) -> u64 {
        self.behavior.break_bonus_min.saturating_mul(60)
    }

    /// Master volume after muting.
    pub fn effective_volume(&self) -> f64 {
        if self.audio.muted {
            0.0
        } else {
            self.audio.master_volume.clamp(0.0, 1.0)
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.durations.pomodoro_min, 25);
        assert!(parsed.behavior.require_task_for_pomodoro);
        assert!((parsed.audio.master_volume - 0.18).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[durations]\npomodoro_min = 50\n").unwrap();
        assert_eq!(parsed.durations.pomodoro_min, 50);
        assert_eq!(parsed.durations.short_min, 5);
        assert_eq!(parsed.behavior.history_limit, 200);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("behavior.auto_advance").as_deref(), Some("false"));
        assert_eq!(cfg.get("durations.long_min").as_deref(), Some("15"));
        assert!(cfg.get("behavior.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("behavior.auto_advance", "true").unwrap();
        cfg.set("durations.short_min", "7").unwrap();
        cfg.set("audio.master_volume", "0.5").unwrap();
        assert!(cfg.behavior.auto_advance);
        assert_eq!(cfg.mode_durations().short, 420);
        assert!((cfg.audio.master_volume - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("behavior.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("behavior.auto_advance", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(!cfg.behavior.auto_advance);
    }

    #[test]
    fn load_from_writes_defaults_then_reads_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.break_bonus_secs(), 600);

        let mut edited = cfg.clone();
        edited.set("audio.muted", "true").unwrap();
        edited.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.effective_volume(), 0.0);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "durations = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
