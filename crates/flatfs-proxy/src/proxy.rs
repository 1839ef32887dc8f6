//! The listing proxy
//!
//! A [`ListingProxy`] exposes one directory level of a flat object store.
//! It caches the backend's delimiter-scoped listing under a TTL, absorbs
//! local creations and removals into a mutation ledger, and reconciles the
//! two on every [`list`](ListingProxy::list) so a just-performed local
//! mutation is never masked by a stale backend view.

use crate::bucket::{Bucket, ListQuery, Listing};
use crate::cache::{CachedListing, ProxyStats};
use crate::clock::Clock;
use crate::error::{EntityKind, ProxyError, Result};
use crate::ledger::{LedgerNote, MutationLedger};
use chrono::{DateTime, Duration, Utc};
use flatfs_common::{DirName, DirNameError, ObjectRecord, ProxyConfig};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A per-directory view of a flat object store.
///
/// All public operations serialize on an internal lock that is held across
/// the backend call during `list`, so callers may share the proxy freely.
pub struct ListingProxy {
    bucket: Arc<dyn Bucket>,
    clock: Arc<dyn Clock>,
    dir: DirName,
    config: ProxyConfig,
    stats: ProxyStats,
    state: Mutex<ProxyState>,
}

struct ProxyState {
    cached: Option<CachedListing>,
    ledger: MutationLedger,
}

impl std::fmt::Debug for ListingProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingProxy")
            .field("bucket", &self.bucket.name())
            .field("dir", &self.dir)
            .field("config", &self.config)
            .finish()
    }
}

impl ListingProxy {
    /// Create a proxy for the directory `dir` within `bucket`.
    ///
    /// `dir` must be empty (the bucket root) or a `/`-terminated path with
    /// no leading `/`.
    pub fn new(
        bucket: Arc<dyn Bucket>,
        clock: Arc<dyn Clock>,
        dir: impl Into<String>,
        config: ProxyConfig,
    ) -> Result<Self> {
        let dir = DirName::new(dir)?;
        Ok(Self::with_dir(bucket, clock, dir, config))
    }

    /// Create a proxy for an already-validated directory name.
    #[must_use]
    pub fn with_dir(
        bucket: Arc<dyn Bucket>,
        clock: Arc<dyn Clock>,
        dir: DirName,
        config: ProxyConfig,
    ) -> Self {
        if !config.notes_outlive_listings() {
            warn!(
                dir = %dir,
                note_ttl_ms = config.note_ttl_ms,
                listing_cache_ttl_ms = config.listing_cache_ttl_ms,
                "note TTL is shorter than the listing cache TTL; local \
                 mutations may expire before the next backend fetch"
            );
        }
        Self {
            bucket,
            clock,
            dir,
            config,
            stats: ProxyStats::default(),
            state: Mutex::new(ProxyState {
                cached: None,
                ledger: MutationLedger::new(),
            }),
        }
    }

    /// The directory this proxy serves.
    #[must_use]
    pub fn name(&self) -> &str {
        self.dir.as_str()
    }

    /// Counters for monitoring.
    #[must_use]
    pub fn stats(&self) -> &ProxyStats {
        &self.stats
    }

    /// Produce the current view of the directory: its objects (in no
    /// particular order) and its immediate sub-directory names.
    ///
    /// Refreshes the cached backend listing when it is older than the
    /// configured TTL, then merges in unexpired local mutation notes; a
    /// note always wins over the backend view for its name.
    pub async fn list(&self) -> Result<(Vec<ObjectRecord>, Vec<String>)> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        let listing_ttl = self.config.listing_cache_ttl();

        let fresh = state
            .cached
            .as_ref()
            .is_some_and(|cached| cached.is_fresh(now, listing_ttl));
        if fresh {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(dir = %self.dir, "serving listing from cache");
        } else {
            debug!(dir = %self.dir, bucket = self.bucket.name(), "fetching listing");
            let query = ListQuery {
                prefix: self.dir.as_str().to_owned(),
                delimiter: "/".to_owned(),
                versions: false,
                cursor: String::new(),
                max_results: 0,
            };
            // Any failure below leaves the previously cached listing as-is.
            let listing = self.bucket.list_objects(&query).await?;
            let (objects, subdirs) = self.validate_listing(listing)?;
            self.stats.backend_fetches.fetch_add(1, Ordering::Relaxed);
            state.cached = Some(CachedListing {
                objects,
                subdirs,
                acquired_at: self.clock.now(),
            });
        }

        let note_ttl = self.config.note_ttl();
        let reaped = state.ledger.sweep(now, note_ttl);
        if reaped > 0 {
            self.stats
                .entries_expired
                .fetch_add(reaped as u64, Ordering::Relaxed);
            debug!(dir = %self.dir, reaped, "reaped expired ledger entries");
        }

        Ok(reconcile(&state, now, note_ttl))
    }

    /// Record a locally created object so subsequent listings include it
    /// even while the backend still reports a stale view.
    ///
    /// The record's name must be a direct child of the directory.
    pub async fn note_new_object(&self, record: ObjectRecord) -> Result<()> {
        let dir = self.dir.as_str();
        if !record.name.starts_with(dir) {
            return Err(ProxyError::non_descendant(
                EntityKind::Object,
                record.name,
                dir,
            ));
        }
        let rest = &record.name[dir.len()..];
        if rest.is_empty() {
            return Err(ProxyError::illegal_object_name(
                record.name,
                "equal to the directory name",
            ));
        }
        if rest.ends_with('/') {
            return Err(ProxyError::illegal_object_name(record.name, "ends with '/'"));
        }
        if rest.contains('/') {
            return Err(ProxyError::illegal_object_name(
                record.name,
                "not a direct child of the directory",
            ));
        }

        let mut state = self.state.lock().await;
        let now = self.clock.now();
        debug!(dir = %self.dir, name = %record.name, "noting new object");
        state.ledger.note_object(record, now);
        self.stats.notes_applied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Record a locally created sub-directory.
    ///
    /// The name must be an immediate child of the directory, in
    /// `/`-terminated form.
    pub async fn note_new_subdirectory(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let dir = self.dir.as_str();
        if !name.starts_with(dir) || name == dir {
            return Err(ProxyError::non_descendant(
                EntityKind::Subdirectory,
                name,
                dir,
            ));
        }
        let rest = &name[dir.len()..];
        if !rest.ends_with('/') {
            return Err(ProxyError::illegal_subdir_name(
                name,
                "missing trailing '/'",
            ));
        }
        if rest[..rest.len() - 1].contains('/') {
            return Err(ProxyError::NotDirectDescendant {
                kind: EntityKind::Subdirectory,
                name,
                dir: dir.to_owned(),
            });
        }

        let mut state = self.state.lock().await;
        let now = self.clock.now();
        debug!(dir = %self.dir, %name, "noting new sub-directory");
        state.ledger.note_subdir(name, now);
        self.stats.notes_applied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Record a local removal of an object or sub-directory, hiding the
    /// name from subsequent listings while the backend catches up.
    ///
    /// Accepts both object form and `/`-terminated sub-directory form; the
    /// name is matched exactly during reconciliation.
    pub async fn note_removal(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !self.dir.is_descendant(&name) {
            let kind = if name.ends_with('/') {
                EntityKind::Subdirectory
            } else {
                EntityKind::Object
            };
            return Err(ProxyError::non_descendant(kind, name, self.dir.as_str()));
        }

        let mut state = self.state.lock().await;
        let now = self.clock.now();
        debug!(dir = %self.dir, %name, "noting removal");
        state.ledger.note_removal(name, now);
        self.stats.notes_applied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Assert the structural rules of the internal state; panics on
    /// violation. Safe to call before and after any public operation.
    pub async fn check_invariants(&self) {
        let state = self.state.lock().await;
        check_state(&self.dir, &state);
    }

    /// Validate a raw backend listing, dropping the directory placeholder.
    fn validate_listing(&self, listing: Listing) -> Result<(Vec<ObjectRecord>, Vec<String>)> {
        let dir = self.dir.as_str();

        let mut objects = Vec::with_capacity(listing.results.len());
        for record in listing.results {
            if record.name == dir {
                // Placeholder materializing the directory itself.
                continue;
            }
            if record.name.ends_with('/') {
                return Err(ProxyError::illegal_object_name(record.name, "ends with '/'"));
            }
            if !record.name.starts_with(dir) {
                return Err(ProxyError::non_descendant(
                    EntityKind::Object,
                    record.name,
                    dir,
                ));
            }
            objects.push(record);
        }

        let mut subdirs = Vec::with_capacity(listing.prefixes.len());
        for name in listing.prefixes {
            if !name.ends_with('/') {
                return Err(DirNameError::MissingTrailingSlash(name).into());
            }
            if !self.dir.is_descendant(&name) {
                return Err(ProxyError::non_descendant(EntityKind::Prefix, name, dir));
            }
            let rest = &name[dir.len()..];
            if rest[..rest.len() - 1].contains('/') {
                return Err(ProxyError::NonImmediatePrefix {
                    name,
                    dir: dir.to_owned(),
                });
            }
            subdirs.push(name);
        }

        Ok((objects, subdirs))
    }
}

/// Merge the cached backend view with unexpired ledger notes.
fn reconcile(
    state: &ProxyState,
    now: DateTime<Utc>,
    note_ttl: Duration,
) -> (Vec<ObjectRecord>, Vec<String>) {
    let mut objects: BTreeMap<String, ObjectRecord> = BTreeMap::new();
    let mut subdirs: BTreeSet<String> = BTreeSet::new();

    if let Some(cached) = &state.cached {
        for record in &cached.objects {
            objects.insert(record.name.clone(), record.clone());
        }
        subdirs.extend(cached.subdirs.iter().cloned());
    }

    // Local notes win over the backend view for their name.
    for (name, note) in state.ledger.active(now, note_ttl) {
        match note {
            LedgerNote::AddObject(record) => {
                objects.insert(name.to_owned(), record.clone());
            }
            LedgerNote::AddSubdir => {
                subdirs.insert(name.to_owned());
            }
            LedgerNote::Remove => {
                objects.remove(name);
                subdirs.remove(name);
            }
        }
    }

    (
        objects.into_values().collect(),
        subdirs.into_iter().collect(),
    )
}

fn check_state(dir: &DirName, state: &ProxyState) {
    let d = dir.as_str();
    if !d.is_empty() {
        assert!(d.ends_with('/'), "directory name {d:?} missing trailing '/'");
        assert!(!d.starts_with('/'), "directory name {d:?} has leading '/'");
    }

    if let Some(cached) = &state.cached {
        for record in &cached.objects {
            assert!(
                dir.is_object_name(&record.name),
                "cached object {:?} out of place under {d:?}",
                record.name
            );
        }
        for name in &cached.subdirs {
            assert!(
                dir.is_immediate_subdir(name),
                "cached sub-directory {name:?} out of place under {d:?}"
            );
        }
    }

    // The ledger keys a single entry per name, so an addition and a removal
    // can never share a key; only per-entry shape remains to be checked.
    for (name, entry) in state.ledger.iter() {
        match &entry.note {
            LedgerNote::AddObject(record) => {
                assert_eq!(
                    record.name, name,
                    "addition keyed under {name:?} carries record for {:?}",
                    record.name
                );
                assert!(
                    dir.is_direct_child_object(name),
                    "added object {name:?} out of place under {d:?}"
                );
            }
            LedgerNote::AddSubdir => {
                assert!(
                    dir.is_immediate_subdir(name),
                    "added sub-directory {name:?} out of place under {d:?}"
                );
            }
            LedgerNote::Remove => {
                assert!(
                    dir.is_descendant(name),
                    "removal {name:?} out of place under {d:?}"
                );
            }
        }
    }
}
