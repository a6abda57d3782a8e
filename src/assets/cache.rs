//! Install, serve and activate one generation of the asset cache.

use futures::future::try_join_all;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use url::Url;

use super::error::{AssetError, Result};
use super::fetcher::{AssetFetcher, AssetResponse};
use super::storage::AssetStore;

/// Lifecycle of a cache generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
  /// Not yet populated, or the last install failed
  Installing,
  /// Populated, older generations may still exist
  Installed,
  /// Populated and every other generation was purged
  Active,
  /// Its region no longer exists
  Superseded,
}

/// Where a served asset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
  Cache,
  Network,
}

/// An asset handed back to the caller
#[derive(Debug, Clone)]
pub struct Served {
  pub response: AssetResponse,
  pub source: FetchSource,
}

/// One generation of the asset cache, named by its version string.
pub struct AssetCache<F: AssetFetcher> {
  fetcher: Arc<F>,
  store: AssetStore,
  version: String,
  base: Url,
  manifest: Vec<String>,
  state: Arc<Mutex<CacheState>>,
}

impl<F: AssetFetcher> AssetCache<F> {
  pub fn new(
    fetcher: F,
    store: AssetStore,
    version: impl Into<String>,
    base: Url,
    manifest: Vec<String>,
  ) -> Self {
    Self {
      fetcher: Arc::new(fetcher),
      store,
      version: version.into(),
      base,
      manifest,
      state: Arc::new(Mutex::new(CacheState::Installing)),
    }
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  pub fn state(&self) -> CacheState {
    self
      .state
      .lock()
      .map(|s| *s)
      .unwrap_or(CacheState::Installing)
  }

  fn set_state(&self, next: CacheState) {
    if let Ok(mut state) = self.state.lock() {
      debug!(version = %self.version, from = ?*state, to = ?next, "asset cache state");
      *state = next;
    }
  }

  /// Resolve a manifest entry or request path against the base URL.
  pub fn resolve(&self, url: &str) -> Result<Url> {
    self.base.join(url).map_err(|source| AssetError::Url {
      url: url.to_string(),
      source,
    })
  }

  /// Fetch one manifest entry, treating a non-success status as a failure.
  async fn fetch_for_install(&self, url: Url) -> Result<AssetResponse> {
    let response = self.fetcher.fetch(&url).await?;
    if !response.is_success() {
      return Err(AssetError::Status {
        url: url.to_string(),
        status: response.status,
      });
    }
    Ok(response)
  }

  /// Fetch the whole manifest into this generation's region.
  ///
  /// All entries are fetched before anything is written; if any of them
  /// fails the region is left exactly as it was.
  pub async fn install(&self) -> Result<usize> {
    self.set_state(CacheState::Installing);

    let urls = self
      .manifest
      .iter()
      .map(|entry| self.resolve(entry))
      .collect::<Result<Vec<_>>>()?;

    let responses = try_join_all(urls.into_iter().map(|url| self.fetch_for_install(url)))
      .await
      .map_err(|e| {
        warn!(version = %self.version, error = %e, "asset install failed");
        e
      })?;

    self.store.put_all(&self.version, &responses)?;
    self.set_state(CacheState::Installed);

    info!(version = %self.version, count = responses.len(), "assets installed");
    Ok(responses.len())
  }

  /// Delete every region that is not this generation. Returns the names of
  /// the deleted regions.
  pub fn activate(&self) -> Result<Vec<String>> {
    let mut deleted = Vec::new();
    for name in self.store.region_names()? {
      if name != self.version {
        self.store.delete_region(&name)?;
        info!(region = %name, "deleted stale asset cache");
        deleted.push(name);
      }
    }

    self.set_state(CacheState::Active);
    Ok(deleted)
  }

  /// Serve a request: exact match from this generation's region, otherwise
  /// a live fetch. Failures are logged and yield `None`.
  pub async fn fetch(&self, url: &str) -> Option<Served> {
    match self.try_fetch(url).await {
      Ok(served) => Some(served),
      Err(e) => {
        warn!(url, error = %e, "asset fetch failed");
        None
      }
    }
  }

  async fn try_fetch(&self, url: &str) -> Result<Served> {
    let url = self.resolve(url)?;

    if let Some(response) = self.store.lookup(&self.version, url.as_str())? {
      return Ok(Served {
        response,
        source: FetchSource::Cache,
      });
    }

    let response = self.fetcher.fetch(&url).await?;
    Ok(Served {
      response,
      source: FetchSource::Network,
    })
  }

  /// Re-check storage: a generation whose region has disappeared after it
  /// was populated has been superseded.
  pub fn refresh_state(&self) -> Result<CacheState> {
    let current = self.state();
    if matches!(current, CacheState::Installed | CacheState::Active)
      && !self.store.region_names()?.contains(&self.version)
      && !self.manifest.is_empty()
    {
      self.set_state(CacheState::Superseded);
    }
    Ok(self.state())
  }
}

impl<F: AssetFetcher> Clone for AssetCache<F> {
  fn clone(&self) -> Self {
    Self {
      fetcher: Arc::clone(&self.fetcher),
      store: self.store.clone(),
      version: self.version.clone(),
      base: self.base.clone(),
      manifest: self.manifest.clone(),
      state: Arc::clone(&self.state),
    }
  }
}
