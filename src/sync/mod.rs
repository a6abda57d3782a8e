//! Decides, per operation, whether to go through the notes service or the
//! local store, and keeps the local store mirroring successful results.

mod policy;
mod view;

pub use policy::{LoadSource, NoteSync};
pub use view::{LogEntry, LogLevel, NoteView};

#[cfg(test)]
pub(crate) use policy::testing;

/// Network status, sampled by the caller at the moment of each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
  Online,
  Offline,
}

impl Connectivity {
  pub fn is_online(self) -> bool {
    self == Self::Online
  }

  pub fn toggled(self) -> Self {
    match self {
      Self::Online => Self::Offline,
      Self::Offline => Self::Online,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Online => "online",
      Self::Offline => "offline",
    }
  }
}
