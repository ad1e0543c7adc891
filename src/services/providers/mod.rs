/// Movie metadata provider abstraction
///
/// The catalog listing is sourced from a third-party metadata service. The
/// provider boundary is one search call that either
/// yields opaque title records or a failure signal.
use std::time::Duration;

use crate::models::MovieSummary;

pub mod omdb;

pub use omdb::OmdbProvider;

/// Failure signal returned by a metadata provider
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Parse(String),
}

/// Trait for movie metadata providers
///
/// Implementations must not let transport, status or decoding failures escape
/// as anything other than [`MetadataError`], and must bound the call in time.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the catalog search results
    async fn search_movies(&self) -> Result<Vec<MovieSummary>, MetadataError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
