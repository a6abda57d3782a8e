//! Local store trait and its SQLite implementation.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::db::Database;

/// Trait for local store backends.
pub trait LocalStore: Send + Sync {
  /// Read the array stored under `key`. Absent or corrupt data yields an
  /// empty list.
  fn get<T: DeserializeOwned>(&self, key: &str) -> Vec<T>;

  /// Serialize `value` and overwrite whatever is stored under `key`.
  fn set<T: Serialize>(&self, key: &str, value: &[T]) -> Result<()>;
}

/// Decode a stored blob, treating malformed data as empty.
pub(super) fn decode_or_empty<T: DeserializeOwned>(key: &str, raw: &str) -> Vec<T> {
  match serde_json::from_str(raw) {
    Ok(values) => values,
    Err(e) => {
      warn!(key, error = %e, "discarding unreadable local store value");
      Vec::new()
    }
  }
}

/// SQLite-backed local store.
#[derive(Clone)]
pub struct SqliteStore {
  db: Arc<Database>,
}

impl SqliteStore {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }

  fn read_raw(&self, key: &str) -> Result<Option<String>> {
    let conn = self.db.conn()?;
    conn
      .query_row(
        "SELECT value FROM kv_store WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read key {}: {}", key, e))
  }
}

impl LocalStore for SqliteStore {
  fn get<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
    match self.read_raw(key) {
      Ok(Some(raw)) => decode_or_empty(key, &raw),
      Ok(None) => Vec::new(),
      Err(e) => {
        warn!(key, error = %e, "local store read failed");
        Vec::new()
      }
    }
  }

  fn set<T: Serialize>(&self, key: &str, value: &[T]) -> Result<()> {
    let data =
      serde_json::to_string(value).map_err(|e| eyre!("Failed to serialize {}: {}", key, e))?;

    let conn = self.db.conn()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![key, data],
      )
      .map_err(|e| eyre!("Failed to write key {}: {}", key, e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notes::Note;

  fn sqlite_store() -> SqliteStore {
    SqliteStore::new(Arc::new(Database::open_in_memory().unwrap()))
  }

  #[test]
  fn test_get_missing_key_is_empty() {
    let store = sqlite_store();
    let notes: Vec<Note> = store.get("notes");
    assert!(notes.is_empty());
  }

  #[test]
  fn test_set_then_get_preserves_order() {
    let store = sqlite_store();
    let notes = vec![Note::new(3, "c"), Note::new(1, "a"), Note::new(2, "b")];
    store.set("notes", &notes).unwrap();

    let loaded: Vec<Note> = store.get("notes");
    assert_eq!(loaded, notes);
  }

  #[test]
  fn test_set_overwrites() {
    let store = sqlite_store();
    store.set("notes", &[Note::new(1, "a")]).unwrap();
    store.set("notes", &[Note::new(2, "b")]).unwrap();

    let loaded: Vec<Note> = store.get("notes");
    assert_eq!(loaded, vec![Note::new(2, "b")]);
  }

  #[test]
  fn test_keys_are_independent() {
    let store = sqlite_store();
    store.set("a", &[Note::new(1, "one")]).unwrap();
    store.set("b", &[Note::new(2, "two")]).unwrap();

    assert_eq!(store.get::<Note>("a"), vec![Note::new(1, "one")]);
    assert_eq!(store.get::<Note>("b"), vec![Note::new(2, "two")]);
  }

  #[test]
  fn test_corrupt_value_reads_as_empty() {
    let sqlite = sqlite_store();
    {
      let conn = sqlite.db.conn().unwrap();
      conn
        .execute(
          "INSERT INTO kv_store (key, value) VALUES ('notes', '[{\"id\":\"x\"}]')",
          [],
        )
        .unwrap();
    }
    assert!(sqlite.get::<Note>("notes").is_empty());
  }
}
