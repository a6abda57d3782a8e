use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sync::Connectivity;

/// Default key the local note collection is stored under.
pub const DEFAULT_NOTES_KEY: &str = "notes";

/// Default asset cache generation name.
pub const DEFAULT_ASSET_VERSION: &str = "notesync-assets-v1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub assets: AssetsConfig,
  /// Start in offline mode
  #[serde(default)]
  pub offline: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Base endpoint of the notes service, e.g. "https://notes.example.com/api/"
  pub url: String,
  /// Request timeout in seconds. Unset means requests may wait indefinitely.
  pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
  /// Key the note collection is persisted under
  #[serde(default = "default_notes_key")]
  pub notes_key: String,
  /// Override for the SQLite database location
  pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      notes_key: default_notes_key(),
      path: None,
    }
  }
}

fn default_notes_key() -> String {
  DEFAULT_NOTES_KEY.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
  /// Name of the current cache generation. Bump it to supersede older ones.
  #[serde(default = "default_asset_version")]
  pub version: String,
  /// Base that relative manifest entries resolve against (defaults to `server.url`)
  pub base_url: Option<String>,
  /// Asset URLs, absolute or relative to the base
  #[serde(default)]
  pub manifest: Vec<String>,
}

impl Default for AssetsConfig {
  fn default() -> Self {
    Self {
      version: default_asset_version(),
      base_url: None,
      manifest: Vec::new(),
    }
  }
}

fn default_asset_version() -> String {
  DEFAULT_ASSET_VERSION.to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./notesync.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/notesync/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/notesync/config.yaml\n\
                 with at least:\n\n  server:\n    url: https://notes.example.com/"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("notesync.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("notesync").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Connectivity the client starts with.
  pub fn initial_connectivity(&self) -> Connectivity {
    if self.offline {
      Connectivity::Offline
    } else {
      Connectivity::Online
    }
  }

  pub fn request_timeout(&self) -> Option<Duration> {
    self.server.timeout_secs.map(Duration::from_secs)
  }

  /// Base URL for relative asset manifest entries.
  pub fn asset_base_url(&self) -> &str {
    self.assets.base_url.as_deref().unwrap_or(&self.server.url)
  }

  /// Location of the SQLite database backing the local store and asset cache.
  pub fn database_path(&self) -> Result<PathBuf> {
    match &self.storage.path {
      Some(p) => Ok(p.clone()),
      None => crate::db::default_path(),
    }
  }
}
