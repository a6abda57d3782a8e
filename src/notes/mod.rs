//! The remote notes service: domain type, wire types and HTTP client.

pub mod api_types;
pub mod client;
pub mod error;
pub mod types;

pub use client::{NoteService, NotesClient};
pub use error::NoteError;
pub use types::Note;
