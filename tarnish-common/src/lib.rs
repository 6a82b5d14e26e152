//! Common types and utilities shared across Tarnish crates.
//!
//! This crate defines the scan data model, observability helpers and the
//! shared error type used throughout the workspace. It stays dependency-light
//! so every other crate can depend on it.
//!
//! # Overview
//!
//! - [`Source`]: platform a mention came from
//! - [`SearchResult`], [`UniqueItem`], [`ClassifiedMention`]: the values that
//!   flow through one scan, in pipeline order
//! - [`GroupedResults`]: mentions bucketed per platform for rendering
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`TarnishError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use tarnish_common::{ClassifiedMention, GroupedResults, Source};
//!
//! let mut grouped = GroupedResults::new();
//! grouped.push(ClassifiedMention {
//!     url: "https://reddit.com/r/x/1".into(),
//!     summary: "Users report missing refunds".into(),
//!     source: Source::Reddit,
//! });
//! assert_eq!(grouped.get(Source::Reddit).len(), 1);
//! assert_eq!(grouped.total(), 1);
//! ```

pub mod observability;
mod types;

pub use types::{
    truncate_chars, ClassifiedMention, GroupedResults, SearchResult, Source, UniqueItem,
};

/// Error types used across the Tarnish system.
#[derive(thiserror::Error, Debug)]
pub enum TarnishError {
    /// A search backend could not be queried.
    #[error("Search error: {0}")]
    Search(String),

    /// The LLM provider failed or returned an unusable answer.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Rendering, PDF conversion or upload failed.
    #[error("Report error: {0}")]
    Report(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`TarnishError`].
pub type Result<T> = std::result::Result<T, TarnishError>;
