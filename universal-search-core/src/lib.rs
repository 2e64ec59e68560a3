//! Shared types for universal-search
//!
//! This crate holds the backend-agnostic query and result model used by
//! every search backend and by the tool server.

use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Lower bound for `max_results`
pub const MIN_RESULTS: u32 = 1;
/// Upper bound for `max_results`
pub const MAX_RESULTS: u32 = 1000;

/// Universal search result.
///
/// `filename` and `extension` are always derived from `path`; construct
/// through [`SearchResult::from_parts`] or [`SearchResult::from_path`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub path: String,
    pub filename: String,
    pub extension: Option<String>,
    pub size: Option<u64>,
    pub created: Option<DateTime<Local>>,
    pub modified: Option<DateTime<Local>>,
    pub accessed: Option<DateTime<Local>>,
    pub attributes: Option<String>,
}

/// Metadata a backend may know about a located path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMetadata {
    pub size: Option<u64>,
    pub created: Option<DateTime<Local>>,
    pub modified: Option<DateTime<Local>>,
    pub accessed: Option<DateTime<Local>>,
    pub attributes: Option<String>,
}

impl SearchResult {
    /// Result with nothing but the path-derived fields
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::from_parts(path, ResultMetadata::default())
    }

    pub fn from_parts(path: impl Into<String>, metadata: ResultMetadata) -> Self {
        let path = path.into();
        let (filename, extension) = split_name(&path);
        Self {
            path,
            filename,
            extension,
            size: metadata.size,
            created: metadata.created,
            modified: metadata.modified,
            accessed: metadata.accessed,
            attributes: metadata.attributes,
        }
    }
}

/// Split a path into its base name and lower-cased extension.
///
/// Names like `.bashrc` or `notes.` have no extension.
pub fn split_name(path: &str) -> (String, Option<String>) {
    let p = Path::new(path);
    let filename = p
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = p
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty());
    (filename, extension)
}

/// Everything-only query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EverythingOptions {
    /// Number of leading results to skip
    #[serde(default)]
    pub offset: u32,
}

/// Backend-agnostic search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search string in the caller's vocabulary
    pub query: String,
    /// Maximum number of results to return (1-1000)
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Match against the full path instead of the file name only
    #[serde(default)]
    pub match_path: bool,
    #[serde(default)]
    pub match_case: bool,
    #[serde(default)]
    pub match_whole_word: bool,
    #[serde(default)]
    pub match_regex: bool,
    /// Sort order; meaning is backend-defined
    #[serde(default = "default_sort_by")]
    pub sort_by: u32,
    /// Extension block honored by the Everything backend only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub everything: Option<EverythingOptions>,
}

fn default_max_results() -> u32 {
    100
}

fn default_sort_by() -> u32 {
    1
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: default_max_results(),
            match_path: false,
            match_case: false,
            match_whole_word: false,
            match_regex: false,
            sort_by: default_sort_by(),
            everything: None,
        }
    }

    /// Parse a tool-call arguments object and validate it
    pub fn from_arguments(arguments: serde_json::Value) -> Result<Self, QueryError> {
        let query: SearchQuery =
            serde_json::from_value(arguments).map_err(|e| QueryError::Malformed(e.to_string()))?;
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if !(MIN_RESULTS..=MAX_RESULTS).contains(&self.max_results) {
            return Err(QueryError::MaxResultsOutOfRange(self.max_results));
        }
        Ok(())
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_match_path(mut self, on: bool) -> Self {
        self.match_path = on;
        self
    }

    pub fn with_match_case(mut self, on: bool) -> Self {
        self.match_case = on;
        self
    }

    pub fn with_match_whole_word(mut self, on: bool) -> Self {
        self.match_whole_word = on;
        self
    }

    pub fn with_match_regex(mut self, on: bool) -> Self {
        self.match_regex = on;
        self
    }

    pub fn with_sort_by(mut self, sort_by: u32) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_everything(mut self, options: EverythingOptions) -> Self {
        self.everything = Some(options);
        self
    }
}

/// Query validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Query string is empty or whitespace
    EmptyQuery,
    /// `max_results` outside 1..=1000
    MaxResultsOutOfRange(u32),
    /// Arguments object could not be decoded
    Malformed(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::EmptyQuery => write!(f, "Query must not be empty"),
            QueryError::MaxResultsOutOfRange(n) => write!(
                f,
                "max_results must be between {} and {}, got {}",
                MIN_RESULTS, MAX_RESULTS, n
            ),
            QueryError::Malformed(msg) => write!(f, "Invalid arguments: {}", msg),
        }
    }
}

impl std::error::Error for QueryError {}

/// Search backend identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// macOS Spotlight via mdfind
    Mdfind,
    /// Linux locate database
    Locate,
    /// Everything SDK on Windows
    Everything,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Mdfind => write!(f, "mdfind"),
            BackendKind::Locate => write!(f, "locate"),
            BackendKind::Everything => write!(f, "Everything"),
        }
    }
}
