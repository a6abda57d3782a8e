//! Client context for one run of the application.

use tracing::{info, warn};

use crate::notes::NoteService;
use crate::sync::{Connectivity, LogEntry, NoteView};

/// Explicitly opened client context holding the session identifier used by
/// the realtime channel.
#[derive(Debug, Default)]
pub struct Session {
  identifier: Option<String>,
  open: bool,
}

impl Session {
  /// Open a session. Online, the identifier is requested from the service;
  /// a failed request leaves the session open without one.
  pub async fn open<C: NoteService + ?Sized>(
    client: &C,
    connectivity: Connectivity,
    view: &dyn NoteView,
  ) -> Self {
    let identifier = if connectivity.is_online() {
      match client.identifier().await {
        Ok(id) => {
          info!(identifier = %id, "session opened");
          Some(id)
        }
        Err(e) => {
          warn!(error = %e, "could not fetch session identifier");
          view.log(LogEntry::failure(format!(
            "Could not start session: {}",
            e.user_message()
          )));
          None
        }
      }
    } else {
      info!("session opened offline");
      None
    };

    Self {
      identifier,
      open: true,
    }
  }

  pub fn identifier(&self) -> Option<&str> {
    self.identifier.as_deref()
  }

  pub fn is_open(&self) -> bool {
    self.open
  }

  pub fn close(&mut self) {
    if self.open {
      info!("session closed");
    }
    self.identifier = None;
    self.open = false;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sync::testing::{FakeService, RecordingView};

  #[tokio::test]
  async fn test_open_online_fetches_identifier() {
    let client = FakeService::with_notes(vec![]);
    let view = RecordingView::default();

    let session = Session::open(&client, Connectivity::Online, &view).await;

    assert!(session.is_open());
    assert_eq!(session.identifier(), Some("session-abc"));
  }

  #[tokio::test]
  async fn test_open_offline_skips_request() {
    let client = FakeService::with_notes(vec![]);
    let view = RecordingView::default();

    let session = Session::open(&client, Connectivity::Offline, &view).await;

    assert!(session.is_open());
    assert_eq!(session.identifier(), None);
    assert_eq!(client.calls(), 0);
  }

  #[tokio::test]
  async fn test_open_with_failing_service_still_opens() {
    let client = FakeService::with_notes(vec![]);
    client.state.lock().unwrap().fail_list = true;
    let view = RecordingView::default();

    let session = Session::open(&client, Connectivity::Online, &view).await;

    assert!(session.is_open());
    assert_eq!(session.identifier(), None);
    assert!(view.has_failure());
  }

  #[tokio::test]
  async fn test_close_clears_state() {
    let client = FakeService::with_notes(vec![]);
    let view = RecordingView::default();
    let mut session = Session::open(&client, Connectivity::Online, &view).await;

    session.close();

    assert!(!session.is_open());
    assert_eq!(session.identifier(), None);
  }
}
