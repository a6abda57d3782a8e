use thiserror::Error;

/// Message shown when an action needs the network but the client is offline.
pub const OFFLINE_MESSAGE: &str = "You are offline. Reconnect and try again.";

/// Failures of note operations.
#[derive(Debug, Error)]
pub enum NoteError {
  /// Rejected locally, no request was made
  #[error("{}", OFFLINE_MESSAGE)]
  Offline,

  /// The request completed but the service signaled failure
  #[error("Remote operation failed: {0}")]
  Remote(String),

  /// The request did not complete
  #[error("Request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The local store could not be written
  #[error("Local store error: {0}")]
  Store(String),
}

impl NoteError {
  /// Message shown in the operation log. Remote and transport failures look
  /// the same to the user.
  pub fn user_message(&self) -> String {
    match self {
      Self::Offline => OFFLINE_MESSAGE.to_string(),
      Self::Remote(_) | Self::Transport(_) => {
        "Something went wrong talking to the server. Try again.".to_string()
      }
      Self::Store(e) => format!("Could not save locally: {}", e),
    }
  }

  pub fn is_offline(&self) -> bool {
    matches!(self, Self::Offline)
  }
}

pub type Result<T> = std::result::Result<T, NoteError>;
