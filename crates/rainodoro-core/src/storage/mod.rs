mod config;
pub mod database;
mod memory;
pub mod state;

pub use config::{AudioConfig, BehaviorConfig, Config, DurationsConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use state::StateRepository;

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// String key-value persistence port.
///
/// Values are JSON documents; the store itself is schema-agnostic. Writes
/// are last-write-wins.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Returns the data directory, creating it if needed.
///
/// `RAINODORO_DATA_DIR` wins when set. Otherwise `~/.config/rainodoro`, or
/// `~/.config/rainodoro-dev` with `RAINODORO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("RAINODORO_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("RAINODORO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("rainodoro-dev")
            } else {
                base_dir.join("rainodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
