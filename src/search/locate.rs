//! Linux backend using the `locate` file-name database

use std::path::PathBuf;

use tracing::debug;
use universal_search_core::{SearchQuery, SearchResult};

use super::normalize::collect_results;
use super::{Capabilities, SearchError, subprocess, translate};

/// File-name search through `locate`.
///
/// The database is rebuilt periodically (usually daily by updatedb), so
/// results can name files that no longer exist; those are skipped.
#[derive(Debug)]
pub struct LocateBackend {
    program: PathBuf,
}

impl Default for LocateBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocateBackend {
    pub const CAPABILITIES: Capabilities = Capabilities {
        match_path: false,
        match_case: true,
        match_whole_word: false,
        match_regex: true,
        sort_by: false,
        extension: false,
    };

    /// Use the `locate` found on PATH
    pub fn new() -> Self {
        Self::with_program(translate::LOCATE)
    }

    /// Use a specific locate binary (plocate, mlocate, ...)
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        let invocation = translate::locate(query);
        let output = subprocess::run(&self.program, &invocation)?;

        if !output.status.success() {
            // locate exits 1 without output when nothing matched
            let silent = output.stdout.is_empty() && output.stderr.is_empty();
            if output.status.code() == Some(1) && silent {
                debug!("locate found no matches for {:?}", query.query);
                return Ok(Vec::new());
            }
            return Err(subprocess::failure(&invocation, &output));
        }

        let paths = subprocess::lines(&output.stdout);
        Ok(collect_results(paths, query.max_results as usize))
    }
}
