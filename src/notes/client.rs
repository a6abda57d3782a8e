use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::config::Config;

use super::api_types::{
  ApiCreateRequest, ApiDeleteRequest, ApiIdentifierResponse, ApiNoteResponse, ApiNotesResponse,
  ApiUpdateRequest,
};
use super::error::{NoteError, Result};
use super::types::Note;

/// Operations offered by the notes service.
///
/// Each call issues exactly one request. Nothing is retried.
#[async_trait]
pub trait NoteService: Send + Sync {
  /// Fetch every note the service knows about
  async fn list_all(&self) -> Result<Vec<Note>>;

  /// Create a note; the service assigns its id
  async fn create(&self, content: &str) -> Result<Note>;

  /// Replace the content of an existing note. `Ok(false)` means the
  /// service answered with a failure status.
  async fn update(&self, note: &Note) -> Result<bool>;

  /// Delete notes by id. `Ok(false)` means the service answered with a
  /// failure status.
  async fn delete(&self, ids: &[i64]) -> Result<bool>;

  /// Session identifier used by the realtime channel
  async fn identifier(&self) -> Result<String>;
}

/// HTTP client for the notes endpoint
#[derive(Clone)]
pub struct NotesClient {
  http: reqwest::Client,
  base: Url,
}

impl NotesClient {
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let base = parse_base_url(&config.server.url)?;

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout() {
      builder = builder.timeout(timeout);
    }
    let http = builder.build()?;

    Ok(Self { http, base })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  fn identifier_url(&self) -> Result<Url> {
    self
      .base
      .join("identifier")
      .map_err(|e| NoteError::Remote(format!("Invalid identifier URL: {}", e)))
  }
}

/// Parse the configured endpoint, making sure relative joins land beneath it.
pub fn parse_base_url(raw: &str) -> color_eyre::Result<Url> {
  let mut url = Url::parse(raw)
    .map_err(|e| color_eyre::eyre::eyre!("Invalid server URL '{}': {}", raw, e))?;
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}

fn check_status(status: StatusCode, action: &str) -> Result<()> {
  if status.is_success() {
    Ok(())
  } else {
    Err(NoteError::Remote(format!("{} returned {}", action, status)))
  }
}

#[async_trait]
impl NoteService for NotesClient {
  async fn list_all(&self) -> Result<Vec<Note>> {
    let response = self.http.get(self.base.clone()).send().await?;
    check_status(response.status(), "GET notes")?;

    let body: ApiNotesResponse = response
      .json()
      .await
      .map_err(|e| NoteError::Remote(format!("Failed to parse notes: {}", e)))?;

    debug!(count = body.notes.len(), "fetched notes");
    Ok(body.notes)
  }

  async fn create(&self, content: &str) -> Result<Note> {
    let response = self
      .http
      .post(self.base.clone())
      .json(&ApiCreateRequest { note: content })
      .send()
      .await?;
    check_status(response.status(), "POST note")?;

    let body: ApiNoteResponse = response
      .json()
      .await
      .map_err(|e| NoteError::Remote(format!("Failed to parse created note: {}", e)))?;

    body
      .note
      .ok_or_else(|| NoteError::Remote("Create response carried no note".to_string()))
  }

  async fn update(&self, note: &Note) -> Result<bool> {
    let notes = std::slice::from_ref(note);
    let response = self
      .http
      .put(self.base.clone())
      .json(&ApiUpdateRequest { notes })
      .send()
      .await?;

    debug!(id = note.id, status = %response.status(), "update note");
    Ok(response.status().is_success())
  }

  async fn delete(&self, ids: &[i64]) -> Result<bool> {
    let response = self
      .http
      .delete(self.base.clone())
      .json(&ApiDeleteRequest { ids })
      .send()
      .await?;

    debug!(?ids, status = %response.status(), "delete notes");
    Ok(response.status().is_success())
  }

  async fn identifier(&self) -> Result<String> {
    let response = self.http.get(self.identifier_url()?).send().await?;
    check_status(response.status(), "GET identifier")?;

    let body: ApiIdentifierResponse = response
      .json()
      .await
      .map_err(|e| NoteError::Remote(format!("Failed to parse identifier: {}", e)))?;

    Ok(body.identifier)
  }
}
