//! SQLite-backed key-value store.
//!
//! A single `kv` table holds every persisted document (timer snapshot,
//! task list, break lists, counters, history).

use std::path::Path;

use rusqlite::{params, Connection};

use super::{data_dir, KvStore};
use crate::error::{Result, StorageError};

/// SQLite database used as the persistent [`KvStore`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/rainodoro.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or the database cannot be
    /// opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("rainodoro.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Ok(self.kv_delete(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rainodoro.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            KvStore::set(&mut db, "k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(KvStore::get(&db, "k").unwrap().as_deref(), Some("v"));
    }
}
