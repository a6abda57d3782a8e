//! In-memory store for tests.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

use super::storage::{decode_or_empty, LocalStore};

/// Store that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
  values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Put a raw string under `key`, bypassing serialization.
  pub fn set_raw(&self, key: &str, raw: &str) {
    if let Ok(mut values) = self.values.lock() {
      values.insert(key.to_string(), raw.to_string());
    }
  }
}

impl LocalStore for MemoryStore {
  fn get<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
    let raw = match self.values.lock() {
      Ok(values) => values.get(key).cloned(),
      Err(e) => {
        warn!(key, error = %e, "memory store lock poisoned");
        None
      }
    };

    raw.map(|raw| decode_or_empty(key, &raw)).unwrap_or_default()
  }

  fn set<T: Serialize>(&self, key: &str, value: &[T]) -> Result<()> {
    let data =
      serde_json::to_string(value).map_err(|e| eyre!("Failed to serialize {}: {}", key, e))?;
    self
      .values
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?
      .insert(key.to_string(), data);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notes::Note;

  #[test]
  fn test_missing_key_is_empty() {
    let store = MemoryStore::new();
    assert!(store.get::<Note>("notes").is_empty());
  }

  #[test]
  fn test_corrupt_value_reads_as_empty() {
    let store = MemoryStore::new();
    store.set_raw("notes", "{not json");
    assert!(store.get::<Note>("notes").is_empty());
  }

  #[test]
  fn test_set_overwrites() {
    let store = MemoryStore::new();
    store.set("notes", &[Note::new(1, "a")]).unwrap();
    store.set("notes", &[Note::new(2, "b")]).unwrap();
    assert_eq!(store.get::<Note>("notes"), vec![Note::new(2, "b")]);
  }
}
