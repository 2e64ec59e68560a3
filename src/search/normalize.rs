//! Normalization of located paths into `SearchResult`s
//!
//! Used by the subprocess backends, which only get a list of paths back and
//! have to stat each one for size and timestamps.

use std::fs::{self, Metadata};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::debug;
use universal_search_core::{ResultMetadata, SearchResult};

use super::ResultMetadataError;

/// Stat `path` and build its result.
///
/// The stat goes through the path as the OS gave it; only the reported
/// `SearchResult::path` is converted lossily to UTF-8.
pub fn stat_result(path: &Path) -> Result<SearchResult, ResultMetadataError> {
    let display = path.to_string_lossy();
    let metadata = fs::metadata(path).map_err(|source| ResultMetadataError {
        path: display.to_string(),
        source,
    })?;
    Ok(SearchResult::from_parts(display, from_metadata(&metadata)))
}

/// Normalize up to `max` paths, skipping paths that cannot be stat'ed.
///
/// The inputs come from an index that may be stale, so a vanished path is
/// expected and never fails the query.
pub fn collect_results<I>(paths: I, max: usize) -> Vec<SearchResult>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    paths
        .into_iter()
        .take(max)
        .filter_map(|path| match stat_result(path.as_ref()) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!("Skipping result: {}", e);
                None
            }
        })
        .collect()
}

fn from_metadata(metadata: &Metadata) -> ResultMetadata {
    ResultMetadata {
        size: Some(metadata.len()),
        created: metadata.created().ok().map(local_time),
        modified: metadata.modified().ok().map(local_time),
        accessed: metadata.accessed().ok().map(local_time),
        attributes: attributes(metadata),
    }
}

fn local_time(t: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(t)
}

#[cfg(unix)]
fn attributes(metadata: &Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:o}", metadata.permissions().mode() & 0o7777))
}

#[cfg(not(unix))]
fn attributes(metadata: &Metadata) -> Option<String> {
    metadata.permissions().readonly().then(|| "R".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn stat_fills_size_and_times() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Notes.TXT");
        fs::write(&path, b"hello world").unwrap();

        let result = stat_result(&path).unwrap();
        assert_eq!(result.filename, "Notes.TXT");
        assert_eq!(result.extension.as_deref(), Some("txt"));
        assert_eq!(result.size, Some(11));
        assert!(result.modified.is_some());
        assert!(result.accessed.is_some());
    }

    #[test]
    fn missing_path_is_metadata_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let err = stat_result(&path).unwrap_err();
        assert_eq!(err.path, path.to_str().unwrap());
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn one_unreachable_path_among_n_yields_n_minus_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for name in ["a.rs", "b.rs", "c.rs", "d.rs"] {
            let p = dir.path().join(name);
            fs::write(&p, name).unwrap();
            paths.push(p.to_string_lossy().into_owned());
        }
        paths.insert(2, dir.path().join("stale.rs").to_string_lossy().into_owned());

        let results = collect_results(&paths, 100);
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.filename != "stale.rs"));
    }

    #[test]
    fn never_more_than_max() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<String> = (0..10)
            .map(|i| {
                let p = dir.path().join(format!("f{i}.log"));
                fs::write(&p, b"").unwrap();
                p.to_string_lossy().into_owned()
            })
            .collect();

        assert_eq!(collect_results(&paths, 3).len(), 3);
        assert_eq!(collect_results(&paths, 1000).len(), 10);
    }

    #[cfg(unix)]
    #[test]
    fn unix_attributes_are_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o754)).unwrap();

        let result = stat_result(&path).unwrap();
        assert_eq!(result.attributes.as_deref(), Some("754"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_still_found() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
        if fs::write(&path, b"x").is_err() {
            // Filesystem only accepts UTF-8 names
            return;
        }

        let results = collect_results([&path], 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].filename, "caf\u{FFFD}.txt");
        assert_eq!(results[0].extension.as_deref(), Some("txt"));
        assert_eq!(results[0].size, Some(1));
    }
}
