use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
  #[error("Invalid asset URL '{url}': {source}")]
  Url {
    url: String,
    #[source]
    source: url::ParseError,
  },

  #[error("Failed to fetch {url}: {message}")]
  Fetch { url: String, message: String },

  #[error("Fetching {url} returned status {status}")]
  Status { url: String, status: u16 },

  #[error("Asset storage error: {0}")]
  Storage(String),
}

pub type Result<T> = std::result::Result<T, AssetError>;
