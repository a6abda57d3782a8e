use chrono::{DateTime, Utc};

use crate::notes::Note;

/// Severity of an operation log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Info,
  Success,
  Failure,
}

/// One line of the visible operation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
  pub at: DateTime<Utc>,
  pub level: LogLevel,
  pub message: String,
}

impl LogEntry {
  fn new(level: LogLevel, message: impl Into<String>) -> Self {
    Self {
      at: Utc::now(),
      level,
      message: message.into(),
    }
  }

  pub fn info(message: impl Into<String>) -> Self {
    Self::new(LogLevel::Info, message)
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self::new(LogLevel::Success, message)
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self::new(LogLevel::Failure, message)
  }

  pub fn is_failure(&self) -> bool {
    self.level == LogLevel::Failure
  }
}

/// Receives the visible effects of sync operations.
pub trait NoteView: Send + Sync {
  /// A newly created note should be shown
  fn note_added(&self, note: &Note);

  /// A note's content changed
  fn note_updated(&self, note: &Note);

  /// A note should disappear
  fn note_removed(&self, id: i64);

  /// Replace everything shown with `notes`, in order
  fn notes_loaded(&self, notes: &[Note]);

  /// Append to the operation log
  fn log(&self, entry: LogEntry);
}
