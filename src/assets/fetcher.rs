use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::error::{AssetError, Result};

/// A fetched asset, as stored in and served from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
  pub url: String,
  pub status: u16,
  pub content_type: Option<String>,
  pub body: Vec<u8>,
}

impl AssetResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Network side of the asset cache
#[async_trait]
pub trait AssetFetcher: Send + Sync {
  async fn fetch(&self, url: &Url) -> Result<AssetResponse>;
}

/// Fetches assets over HTTP
#[derive(Clone, Default)]
pub struct HttpFetcher {
  http: reqwest::Client,
}

fn fetch_error(url: &Url, e: reqwest::Error) -> AssetError {
  AssetError::Fetch {
    url: url.to_string(),
    message: e.to_string(),
  }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
  async fn fetch(&self, url: &Url) -> Result<AssetResponse> {
    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| fetch_error(url, e))?;

    let status = response.status().as_u16();
    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(String::from);
    let body = response
      .bytes()
      .await
      .map_err(|e| fetch_error(url, e))?
      .to_vec();

    Ok(AssetResponse {
      url: url.to_string(),
      status,
      content_type,
      body,
    })
  }
}
