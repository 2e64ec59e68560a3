//! universal-search - one file search tool over the platform's native search
//!
//! - macOS: Spotlight via `mdfind`
//! - Linux: the `locate` database
//! - Windows: the Everything SDK
//!
//! The backend is chosen once at startup ([`search::resolve`]) and serves
//! every request through the same [`SearchQuery`] / [`SearchResult`] model.

pub mod config;
pub mod mcp;
pub mod platform;
pub mod search;

pub use universal_search_core::{
    BackendKind, EverythingOptions, QueryError, ResultMetadata, SearchQuery, SearchResult,
};
