//! flatfs Common - Shared types and configuration
//!
//! This crate provides the types shared across flatfs components: validated
//! directory names, object records, and proxy configuration.

pub mod config;
pub mod types;

pub use config::{ProxyConfig, DEFAULT_LISTING_CACHE_TTL_MS};
pub use types::{DirName, DirNameError, ObjectRecord};
