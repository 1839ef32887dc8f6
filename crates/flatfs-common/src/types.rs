//! Core type definitions for flatfs
//!
//! This module defines the fundamental types shared across components:
//! validated directory names and object records.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name of a proxied directory within a bucket.
///
/// Either empty (the bucket root) or a `/`-terminated path with no leading
/// `/` and no empty interior segments, e.g. `"some/dir/"`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct DirName(String);

impl DirName {
    /// Create a new directory name, validating its shape.
    pub fn new(name: impl Into<String>) -> Result<Self, DirNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create without validation (internal use only).
    #[must_use]
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The bucket root.
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Get the directory name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the bucket root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The part of `name` past this directory's prefix, or `None` when
    /// `name` is not a strict descendant.
    #[must_use]
    pub fn child_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        match name.strip_prefix(self.as_str()) {
            Some(rest) if !rest.is_empty() => Some(rest),
            _ => None,
        }
    }

    /// Whether `name` is a strict descendant of this directory.
    #[must_use]
    pub fn is_descendant(&self, name: &str) -> bool {
        self.child_suffix(name).is_some()
    }

    /// Whether `name` has object form under this directory: a strict
    /// descendant that does not end with `/`. Nested names qualify.
    #[must_use]
    pub fn is_object_name(&self, name: &str) -> bool {
        self.child_suffix(name).is_some_and(|rest| !rest.ends_with('/'))
    }

    /// Whether `name` names a direct child object: object form with no
    /// further `/` past the directory prefix.
    #[must_use]
    pub fn is_direct_child_object(&self, name: &str) -> bool {
        self.child_suffix(name).is_some_and(|rest| !rest.contains('/'))
    }

    /// Whether `name` names an immediate sub-directory: a strict descendant
    /// of the form `prefix + segment + "/"` where `segment` contains no `/`.
    #[must_use]
    pub fn is_immediate_subdir(&self, name: &str) -> bool {
        self.child_suffix(name).is_some_and(|rest| {
            rest.ends_with('/') && !rest[..rest.len() - 1].contains('/')
        })
    }

    /// Validate directory name shape.
    fn validate(name: &str) -> Result<(), DirNameError> {
        if name.is_empty() {
            return Ok(());
        }
        if name.starts_with('/') {
            return Err(DirNameError::LeadingSlash(name.to_owned()));
        }
        if !name.ends_with('/') {
            return Err(DirNameError::MissingTrailingSlash(name.to_owned()));
        }
        if name[..name.len() - 1].split('/').any(str::is_empty) {
            return Err(DirNameError::EmptySegment(name.to_owned()));
        }
        Ok(())
    }
}

impl fmt::Debug for DirName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirName({:?})", self.0)
    }
}

/// Errors that can occur when creating a directory name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirNameError {
    #[error("illegal directory name {0:?}: missing trailing '/'")]
    MissingTrailingSlash(String),
    #[error("illegal directory name {0:?}: must not start with '/'")]
    LeadingSlash(String),
    #[error("illegal directory name {0:?}: empty path segment")]
    EmptySegment(String),
}

impl DirNameError {
    /// The offending name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::MissingTrailingSlash(n) | Self::LeadingSlash(n) | Self::EmptySegment(n) => n,
        }
    }
}

/// A single object in the store: its full name plus metadata carried
/// through verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Full object name, including any directory prefix.
    pub name: String,
    /// Object size in bytes.
    pub size: u64,
    /// Entity tag as reported by the store.
    pub etag: String,
    /// Last modification time as reported by the store.
    pub updated: DateTime<Utc>,
    /// User metadata key/value pairs.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ObjectRecord {
    /// Create a record with empty metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            etag: String::new(),
            updated: DateTime::UNIX_EPOCH,
            metadata: HashMap::new(),
        }
    }

    /// Set the entity tag.
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = etag.into();
        self
    }

    /// Set the modification time.
    #[must_use]
    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = updated;
        self
    }

    /// Add a user metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
