use serde::{Deserialize, Serialize};

/// A user-authored note. `id` is assigned by the server and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub id: i64,
  pub note: String,
}

impl Note {
  pub fn new(id: i64, note: impl Into<String>) -> Self {
    Self {
      id,
      note: note.into(),
    }
  }
}
