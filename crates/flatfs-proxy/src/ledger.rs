//! Mutation ledger
//!
//! Records local object and sub-directory creations and removals that the
//! backend may not reflect yet. One entry per name; a newer note for a name
//! replaces the older one, so an addition and a removal can never coexist.
//! Entries expire lazily after their TTL.

use chrono::{DateTime, Duration, Utc};
use flatfs_common::ObjectRecord;
use std::collections::HashMap;

/// A noted local mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum LedgerNote {
    /// An object was created or rewritten locally.
    AddObject(ObjectRecord),
    /// A sub-directory was created locally.
    AddSubdir,
    /// An object or sub-directory was removed locally.
    Remove,
}

impl LedgerNote {
    /// Whether this note records an addition.
    #[must_use]
    pub fn is_addition(&self) -> bool {
        !matches!(self, Self::Remove)
    }
}

/// A ledger entry: the note plus when it was recorded.
#[derive(Clone, Debug)]
pub struct LedgerEntry {
    pub note: LedgerNote,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Whether the entry has outlived `ttl` at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.recorded_at) > ttl
    }
}

/// The set of local mutations not yet contradicted or confirmed by a
/// trusted backend listing, keyed by full name.
#[derive(Debug, Default)]
pub struct MutationLedger {
    entries: HashMap<String, LedgerEntry>,
}

impl MutationLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object addition, displacing any prior note for the name.
    pub fn note_object(&mut self, record: ObjectRecord, now: DateTime<Utc>) {
        self.entries.insert(
            record.name.clone(),
            LedgerEntry {
                note: LedgerNote::AddObject(record),
                recorded_at: now,
            },
        );
    }

    /// Record a sub-directory addition, displacing any prior note.
    pub fn note_subdir(&mut self, name: String, now: DateTime<Utc>) {
        self.entries.insert(
            name,
            LedgerEntry {
                note: LedgerNote::AddSubdir,
                recorded_at: now,
            },
        );
    }

    /// Record a removal, displacing any prior note.
    pub fn note_removal(&mut self, name: String, now: DateTime<Utc>) {
        self.entries.insert(
            name,
            LedgerEntry {
                note: LedgerNote::Remove,
                recorded_at: now,
            },
        );
    }

    /// Look up the entry for a name, expired or not.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LedgerEntry> {
        self.entries.get(name)
    }

    /// Iterate over entries that have not expired at `now` under `ttl`.
    pub fn active(
        &self,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> impl Iterator<Item = (&str, &LedgerNote)> {
        self.entries
            .iter()
            .filter(move |(_, entry)| !entry.is_expired(now, ttl))
            .map(|(name, entry)| (name.as_str(), &entry.note))
    }

    /// Iterate over all entries, for invariant checks.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Drop expired entries; returns how many were reaped.
    pub fn sweep(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        before - self.entries.len()
    }

    /// Number of entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
