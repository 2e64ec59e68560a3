//! macOS Spotlight backend using `mdfind`

use std::path::PathBuf;

use universal_search_core::{SearchQuery, SearchResult};

use super::normalize::collect_results;
use super::{Capabilities, SearchError, subprocess, translate};

/// Spotlight search through the `mdfind` command.
///
/// Only `match_path` is honored (name-only vs. full-text query).
#[derive(Debug)]
pub struct MdfindBackend {
    program: PathBuf,
}

impl Default for MdfindBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MdfindBackend {
    pub const CAPABILITIES: Capabilities = Capabilities {
        match_path: true,
        match_case: false,
        match_whole_word: false,
        match_regex: false,
        sort_by: false,
        extension: false,
    };

    pub fn new() -> Self {
        Self::with_program(translate::MDFIND)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        let invocation = translate::mdfind(query);
        let output = subprocess::run(&self.program, &invocation)?;
        if !output.status.success() {
            return Err(subprocess::failure(&invocation, &output));
        }

        let paths = subprocess::lines(&output.stdout);
        Ok(collect_results(paths, query.max_results as usize))
    }
}
