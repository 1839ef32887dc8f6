//! Backend object-store abstraction
//!
//! The proxy talks to the store through the [`Bucket`] trait, whose only
//! directory primitive is a delimiter-scoped flat listing.

use async_trait::async_trait;
use flatfs_common::ObjectRecord;
use thiserror::Error;

/// Parameters for one listing request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only names starting with this prefix are returned.
    pub prefix: String,
    /// Names containing this string past the prefix are rolled up into
    /// [`Listing::prefixes`]. Empty disables roll-up.
    pub delimiter: String,
    /// Include non-current object versions.
    pub versions: bool,
    /// Resume after this name. Empty starts from the beginning.
    pub cursor: String,
    /// Cap on returned results; `0` means no cap.
    pub max_results: usize,
}

/// Result of one listing request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    /// Objects whose names matched the query directly.
    pub results: Vec<ObjectRecord>,
    /// Rolled-up name groups, each ending with the delimiter.
    pub prefixes: Vec<String>,
}

/// Errors surfaced by a bucket implementation
#[derive(Debug, Error)]
pub enum BucketError {
    /// The store rejected or failed the request.
    #[error("{0}")]
    Backend(String),

    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// Transport-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A flat object store scoped to one bucket.
///
/// Implementations must be safe to share across tasks. Cancellation is the
/// caller's: dropping the `list_objects` future abandons the request, and an
/// implementation that observes cancellation out of band reports it as
/// [`BucketError::Cancelled`].
#[async_trait]
pub trait Bucket: Send + Sync {
    /// The bucket's name, for diagnostics.
    fn name(&self) -> &str;

    /// Execute one listing request against the store.
    async fn list_objects(&self, query: &ListQuery) -> Result<Listing, BucketError>;
}
