//! Static asset cache for offline availability.
//!
//! A fixed manifest of URLs is fetched into a region named after the current
//! cache version. Requests are served cache-first with a network fallback,
//! and activating a version drops every region that belongs to another one.

mod cache;
mod error;
mod fetcher;
mod storage;

pub use cache::{AssetCache, FetchSource};
pub use fetcher::HttpFetcher;
pub use storage::AssetStore;
