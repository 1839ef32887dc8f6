//! Listing proxy error types

use crate::bucket::BucketError;
use flatfs_common::DirNameError;
use std::fmt;
use thiserror::Error;

/// Result type for listing proxy operations
pub type Result<T> = std::result::Result<T, ProxyError>;

/// What kind of entry an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Object,
    Prefix,
    Subdirectory,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Prefix => write!(f, "prefix"),
            Self::Subdirectory => write!(f, "sub-directory"),
        }
    }
}

/// Listing proxy error
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Malformed directory name, at construction or in a backend listing.
    #[error(transparent)]
    IllegalDirectoryName(#[from] DirNameError),

    /// Backend returned a prefix deeper than one level below the directory.
    #[error("illegal directory name {name:?}: not an immediate child of {dir:?}")]
    NonImmediatePrefix { name: String, dir: String },

    #[error("illegal object name {name:?}: {reason}")]
    IllegalObjectName { name: String, reason: &'static str },

    #[error("illegal sub-directory name {name:?}: {reason}")]
    IllegalSubdirectoryName { name: String, reason: &'static str },

    #[error("{kind} {name:?} is not a descendant of directory {dir:?}")]
    NonDescendant {
        kind: EntityKind,
        name: String,
        dir: String,
    },

    #[error("{kind} {name:?} is not a direct descendant of directory {dir:?}")]
    NotDirectDescendant {
        kind: EntityKind,
        name: String,
        dir: String,
    },

    /// The backend listing call failed.
    #[error("List: {0}")]
    Backend(#[from] BucketError),
}

impl ProxyError {
    /// Create an illegal object name error
    pub fn illegal_object_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::IllegalObjectName {
            name: name.into(),
            reason,
        }
    }

    /// Create an illegal sub-directory name error
    pub fn illegal_subdir_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::IllegalSubdirectoryName {
            name: name.into(),
            reason,
        }
    }

    /// Create a non-descendant error
    pub fn non_descendant(
        kind: EntityKind,
        name: impl Into<String>,
        dir: impl Into<String>,
    ) -> Self {
        Self::NonDescendant {
            kind,
            name: name.into(),
            dir: dir.into(),
        }
    }
}
