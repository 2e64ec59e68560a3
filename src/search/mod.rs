//! Search backend abstraction layer
//!
//! Provides one interface over the platform search backends:
//! - mdfind (Spotlight) on macOS
//! - locate on Linux
//! - Everything SDK on Windows

pub mod everything;
pub mod everything_sdk;
pub mod locate;
pub mod manager;
pub mod mdfind;
pub mod normalize;
pub mod subprocess;
pub mod translate;

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use universal_search_core::{BackendKind, QueryError, SearchQuery, SearchResult};

pub use everything::EverythingBackend;
pub use locate::LocateBackend;
pub use manager::{resolve, resolve_for};
pub use mdfind::MdfindBackend;

/// Errors that prevent the process from serving any query
#[derive(Error, Debug)]
pub enum InitError {
    #[error("No search backend available for platform '{0}'")]
    UnsupportedPlatform(String),

    #[error("Failed to load Everything SDK from {path:?}: {source}")]
    BackendInit {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
}

/// Per-query search errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Everything query failed: {0}")]
    Sdk(String),
}

impl SearchError {
    /// True when the backend itself failed, as opposed to a rejected query
    pub fn is_execution(&self) -> bool {
        !matches!(self, SearchError::InvalidQuery(_))
    }
}

/// A located path whose metadata could not be read
#[derive(Error, Debug)]
#[error("Failed to stat {path}: {source}")]
pub struct ResultMetadataError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// Query toggles a backend acts on. Anything else is accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub match_path: bool,
    pub match_case: bool,
    pub match_whole_word: bool,
    pub match_regex: bool,
    pub sort_by: bool,
    /// Backend-specific extension block
    pub extension: bool,
}

impl Capabilities {
    /// Requested toggles this backend will not honor
    pub fn ignored(&self, query: &SearchQuery) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if query.match_path && !self.match_path {
            ignored.push("match_path");
        }
        if query.match_case && !self.match_case {
            ignored.push("match_case");
        }
        if query.match_whole_word && !self.match_whole_word {
            ignored.push("match_whole_word");
        }
        if query.match_regex && !self.match_regex {
            ignored.push("match_regex");
        }
        if query.sort_by != 1 && !self.sort_by {
            ignored.push("sort_by");
        }
        if query.everything.is_some() && !self.extension {
            ignored.push("everything");
        }
        ignored
    }

    /// Names of the honored toggles
    pub fn honored(&self) -> Vec<&'static str> {
        [
            ("match_path", self.match_path),
            ("match_case", self.match_case),
            ("match_whole_word", self.match_whole_word),
            ("match_regex", self.match_regex),
            ("sort_by", self.sort_by),
            ("everything", self.extension),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

/// The search backend for the running platform.
///
/// Built once at startup and shared read-only between requests.
pub enum SearchBackend {
    Mdfind(MdfindBackend),
    Locate(LocateBackend),
    Everything(EverythingBackend),
}

impl SearchBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            SearchBackend::Mdfind(_) => BackendKind::Mdfind,
            SearchBackend::Locate(_) => BackendKind::Locate,
            SearchBackend::Everything(_) => BackendKind::Everything,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            SearchBackend::Mdfind(_) => MdfindBackend::CAPABILITIES,
            SearchBackend::Locate(_) => LocateBackend::CAPABILITIES,
            SearchBackend::Everything(_) => EverythingBackend::CAPABILITIES,
        }
    }

    /// Run a query; blocks until the backend has finished
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        query.validate()?;

        let ignored = self.capabilities().ignored(query);
        if !ignored.is_empty() {
            debug!("{} ignores requested options: {}", self.kind(), ignored.join(", "));
        }

        let mut results = match self {
            SearchBackend::Mdfind(b) => b.search(query)?,
            SearchBackend::Locate(b) => b.search(query)?,
            SearchBackend::Everything(b) => b.search(query)?,
        };
        results.truncate(query.max_results as usize);

        debug!("{} returned {} results for {:?}", self.kind(), results.len(), query.query);
        Ok(results)
    }

    /// Human-readable description of the backend and what it supports
    pub fn status_description(&self) -> String {
        let honored = self.capabilities().honored();
        if honored.is_empty() {
            format!("{} (no optional match modes)", self.kind())
        } else {
            format!("{} (supports {})", self.kind(), honored.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use universal_search_core::EverythingOptions;

    #[test]
    fn ignored_lists_only_requested_unsupported_toggles() {
        let caps = MdfindBackend::CAPABILITIES;
        let query = SearchQuery::new("x")
            .with_match_path(true)
            .with_match_case(true)
            .with_match_regex(true)
            .with_sort_by(3);
        assert_eq!(caps.ignored(&query), vec!["match_case", "match_regex", "sort_by"]);
    }

    #[test]
    fn default_query_ignores_nothing() {
        let query = SearchQuery::new("x");
        for caps in [
            MdfindBackend::CAPABILITIES,
            LocateBackend::CAPABILITIES,
            EverythingBackend::CAPABILITIES,
        ] {
            assert!(caps.ignored(&query).is_empty());
        }
    }

    #[test]
    fn everything_honors_every_field() {
        let query = SearchQuery::new("x")
            .with_match_path(true)
            .with_match_case(true)
            .with_match_whole_word(true)
            .with_match_regex(true)
            .with_sort_by(7)
            .with_everything(EverythingOptions { offset: 3 });
        assert!(EverythingBackend::CAPABILITIES.ignored(&query).is_empty());
        assert_eq!(
            LocateBackend::CAPABILITIES.ignored(&query),
            vec!["match_path", "match_whole_word", "sort_by", "everything"]
        );
    }

    #[test]
    fn execution_errors_are_distinguished_from_bad_queries() {
        assert!(!SearchError::from(QueryError::EmptyQuery).is_execution());
        assert!(SearchError::Sdk("EVERYTHING_ERROR_IPC".into()).is_execution());
        let failed = SearchError::Failed {
            program: "locate",
            status: "exit status: 2".into(),
            stderr: "no database".into(),
        };
        assert!(failed.is_execution());
        assert_eq!(failed.to_string(), "locate failed (exit status: 2): no database");
    }
}
