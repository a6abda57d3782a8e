//! SQLite persistence for asset cache regions.

use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::db::Database;

use super::error::{AssetError, Result};
use super::fetcher::AssetResponse;

/// Stable, fixed-length key for a URL
fn url_hash(url: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(url.as_bytes());
  hex::encode(hasher.finalize())
}

fn storage_error(context: &str, e: impl std::fmt::Display) -> AssetError {
  AssetError::Storage(format!("{}: {}", context, e))
}

/// Named cache regions, each holding responses keyed by exact URL.
#[derive(Clone)]
pub struct AssetStore {
  db: Arc<Database>,
}

impl AssetStore {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }

  fn conn(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>> {
    self.db.conn().map_err(|e| storage_error("Failed to lock database", e))
  }

  /// Write every response into `region` in one transaction. Either all of
  /// them land or none do. Existing entries in the region are kept.
  pub fn put_all(&self, region: &str, responses: &[AssetResponse]) -> Result<()> {
    let mut conn = self.conn()?;
    let tx = conn
      .transaction()
      .map_err(|e| storage_error("Failed to begin transaction", e))?;

    for response in responses {
      tx.execute(
        "INSERT OR REPLACE INTO asset_cache (region, url_hash, url, status, content_type, body, cached_at)
         VALUES (?, ?, ?, ?, ?, ?, datetime('now'))",
        params![
          region,
          url_hash(&response.url),
          response.url,
          response.status,
          response.content_type,
          response.body
        ],
      )
      .map_err(|e| storage_error("Failed to store asset", e))?;
    }

    tx
      .commit()
      .map_err(|e| storage_error("Failed to commit transaction", e))?;

    Ok(())
  }

  /// Look up the response stored for exactly `url`
  pub fn lookup(&self, region: &str, url: &str) -> Result<Option<AssetResponse>> {
    let conn = self.conn()?;
    conn
      .query_row(
        "SELECT url, status, content_type, body FROM asset_cache
         WHERE region = ? AND url_hash = ?",
        params![region, url_hash(url)],
        |row| {
          Ok(AssetResponse {
            url: row.get(0)?,
            status: row.get(1)?,
            content_type: row.get(2)?,
            body: row.get(3)?,
          })
        },
      )
      .optional()
      .map_err(|e| storage_error("Failed to look up asset", e))
  }

  /// Names of all regions holding at least one entry
  pub fn region_names(&self) -> Result<Vec<String>> {
    let conn = self.conn()?;
    let mut stmt = conn
      .prepare("SELECT DISTINCT region FROM asset_cache ORDER BY region")
      .map_err(|e| storage_error("Failed to prepare query", e))?;

    let names = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| storage_error("Failed to list regions", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| storage_error("Failed to read region name", e))?;

    Ok(names)
  }

  /// Drop a region and everything in it
  pub fn delete_region(&self, region: &str) -> Result<usize> {
    let conn = self.conn()?;
    conn
      .execute("DELETE FROM asset_cache WHERE region = ?", params![region])
      .map_err(|e| storage_error("Failed to delete region", e))
  }

  /// Number of entries in a region
  pub fn count(&self, region: &str) -> Result<usize> {
    let conn = self.conn()?;
    let count: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM asset_cache WHERE region = ?",
        params![region],
        |row| row.get(0),
      )
      .map_err(|e| storage_error("Failed to count assets", e))?;
    Ok(count as usize)
  }
}
