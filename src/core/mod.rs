//! Core abstractions: rate data, sources and state streams

pub mod config;
pub mod log;
pub mod rates;
pub mod source;
pub mod stream;

// Re-export main types for cleaner imports
pub use rates::{LoadState, RateEntry, RateSnapshot};
pub use source::{AttemptOutcome, FetchAttempt, FetchError, RateSource, SourceKind};
pub use stream::ReplayLatest;
