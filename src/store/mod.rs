//! Local key-value persistence used as the offline fallback.
//!
//! Every key holds one JSON array. Reads never fail: a missing or unreadable
//! value comes back as an empty list. Writes overwrite the whole value.

#[cfg(test)]
mod memory;
mod storage;

#[cfg(test)]
pub use memory::MemoryStore;
pub use storage::{LocalStore, SqliteStore};
