//! In-memory bucket implementation for tests, local demos, and embedding.

use crate::bucket::{Bucket, BucketError, ListQuery, Listing};
use async_trait::async_trait;
use flatfs_common::ObjectRecord;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A [`Bucket`] backed by a sorted in-memory map.
///
/// Listing semantics match a delimiter-scoped store: names sharing a prefix
/// up to the delimiter are rolled up into common prefixes. Failures can be
/// injected with [`fail_next_list`](Self::fail_next_list) and issued queries
/// are recorded for inspection.
pub struct MemoryBucket {
    name: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<String, ObjectRecord>,
    pending_failures: VecDeque<String>,
    queries: Vec<ListQuery>,
}

impl MemoryBucket {
    /// Create an empty bucket with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Insert or replace an object.
    pub fn put(&self, record: ObjectRecord) {
        let mut state = self.state.lock();
        state.objects.insert(record.name.clone(), record);
    }

    /// Remove an object by name.
    pub fn remove(&self, name: &str) -> Option<ObjectRecord> {
        self.state.lock().objects.remove(name)
    }

    /// Make the next `list_objects` call fail with the given reason.
    pub fn fail_next_list(&self, reason: impl Into<String>) {
        self.state.lock().pending_failures.push_back(reason.into());
    }

    /// Queries issued so far, in order.
    #[must_use]
    pub fn recorded_queries(&self) -> Vec<ListQuery> {
        self.state.lock().queries.clone()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().objects.len()
    }

    /// Whether the bucket holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().objects.is_empty()
    }
}

#[async_trait]
impl Bucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_objects(&self, query: &ListQuery) -> Result<Listing, BucketError> {
        let mut state = self.state.lock();
        state.queries.push(query.clone());

        if let Some(reason) = state.pending_failures.pop_front() {
            return Err(BucketError::Backend(reason));
        }

        let mut results = Vec::new();
        let mut prefixes = BTreeSet::new();

        for (key, record) in state.objects.range(query.prefix.clone()..) {
            if !key.starts_with(&query.prefix) {
                break;
            }
            if !query.cursor.is_empty() && key.as_str() <= query.cursor.as_str() {
                continue;
            }

            let past_prefix = &key[query.prefix.len()..];
            if !query.delimiter.is_empty() && !past_prefix.is_empty() {
                if let Some(pos) = past_prefix.find(&query.delimiter) {
                    prefixes.insert(format!(
                        "{}{}{}",
                        query.prefix,
                        &past_prefix[..pos],
                        query.delimiter
                    ));
                    continue;
                }
            }

            results.push(record.clone());
            if query.max_results > 0 && results.len() >= query.max_results {
                break;
            }
        }

        Ok(Listing {
            results,
            prefixes: prefixes.into_iter().collect(),
        })
    }
}
