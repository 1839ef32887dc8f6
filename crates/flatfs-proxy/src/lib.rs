//! flatfs Proxy - Per-directory listing proxy over a flat object store
//!
//! This crate bridges one level of a hierarchical directory view onto a
//! flat object store whose only directory primitive is delimiter-based
//! listing:
//!
//! - [`Bucket`] abstracts the store's listing call.
//! - [`ListingProxy`] caches the backend listing under a TTL, absorbs local
//!   creations and removals, and reconciles the two on every list.
//! - [`MemoryBucket`] is an in-memory store for tests, demos, and embedding.

pub mod bucket;
pub mod cache;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod proxy;

pub use bucket::{Bucket, BucketError, ListQuery, Listing};
pub use cache::{CachedListing, ProxyStats};
pub use clock::{Clock, SimulatedClock, SystemClock};
pub use error::{EntityKind, ProxyError, Result};
pub use ledger::{LedgerEntry, LedgerNote, MutationLedger};
pub use memory::MemoryBucket;
pub use proxy::ListingProxy;
