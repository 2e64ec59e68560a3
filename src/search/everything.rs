//! Windows backend using the Everything SDK
//!
//! Query execution, sorting and result materialization all happen inside
//! the SDK; this module normalizes the query string on the way in and maps
//! raw SDK rows onto `SearchResult` on the way out.

use std::path::Path;

use chrono::{DateTime, Local};
use universal_search_core::{ResultMetadata, SearchQuery, SearchResult};

use super::everything_sdk::{EverythingSdk, RawRecord};
use super::{Capabilities, InitError, SearchError, translate};

/// 100ns ticks between 1601-01-01 and 1970-01-01
const FILETIME_UNIX_EPOCH: u64 = 116_444_736_000_000_000;

const FILE_ATTRIBUTE_READONLY: u32 = 0x01;
const FILE_ATTRIBUTE_HIDDEN: u32 = 0x02;
const FILE_ATTRIBUTE_SYSTEM: u32 = 0x04;
const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x20;

/// Search through a loaded Everything SDK
pub struct EverythingBackend {
    sdk: EverythingSdk,
}

impl EverythingBackend {
    pub const CAPABILITIES: Capabilities = Capabilities {
        match_path: true,
        match_case: true,
        match_whole_word: true,
        match_regex: true,
        sort_by: true,
        extension: true,
    };

    /// Load the SDK; fails before any query can be accepted
    pub fn new(sdk_path: &Path) -> Result<Self, InitError> {
        let sdk = EverythingSdk::load(sdk_path).map_err(|source| InitError::BackendInit {
            path: sdk_path.to_path_buf(),
            source,
        })?;
        Ok(Self { sdk })
    }

    pub fn sdk_path(&self) -> &Path {
        self.sdk.path()
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        let request = translate::everything(query);
        let records = self.sdk.query(&request).map_err(SearchError::Sdk)?;
        Ok(records.into_iter().map(to_result).collect())
    }
}

fn to_result(record: RawRecord) -> SearchResult {
    let metadata = ResultMetadata {
        size: record.size,
        created: record.created.and_then(filetime_to_local),
        modified: record.modified.and_then(filetime_to_local),
        accessed: record.accessed.and_then(filetime_to_local),
        attributes: record.attributes.map(attribute_string),
    };
    SearchResult::from_parts(record.path, metadata)
}

/// Convert FILETIME ticks to local time; 0 and all-ones mean "unknown"
fn filetime_to_local(ticks: u64) -> Option<DateTime<Local>> {
    if ticks == 0 || ticks == u64::MAX || ticks < FILETIME_UNIX_EPOCH {
        return None;
    }
    let since_epoch = ticks - FILETIME_UNIX_EPOCH;
    let secs = i64::try_from(since_epoch / 10_000_000).ok()?;
    let nanos = ((since_epoch % 10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos).map(|utc| utc.with_timezone(&Local))
}

/// Render Windows file attributes as letters, e.g. `RHA`
fn attribute_string(attrs: u32) -> String {
    [
        (FILE_ATTRIBUTE_READONLY, 'R'),
        (FILE_ATTRIBUTE_HIDDEN, 'H'),
        (FILE_ATTRIBUTE_SYSTEM, 'S'),
        (FILE_ATTRIBUTE_DIRECTORY, 'D'),
        (FILE_ATTRIBUTE_ARCHIVE, 'A'),
    ]
    .into_iter()
    .filter(|(bit, _)| attrs & bit != 0)
    .map(|(_, c)| c)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn filetime_conversion() {
        assert_eq!(
            filetime_to_local(FILETIME_UNIX_EPOCH).map(|t| t.with_timezone(&Utc)),
            Some(Utc.timestamp_opt(0, 0).unwrap())
        );

        // 2024-01-01T00:00:00.5Z
        let ticks = FILETIME_UNIX_EPOCH + 1_704_067_200 * 10_000_000 + 5_000_000;
        let t = filetime_to_local(ticks).unwrap().with_timezone(&Utc);
        assert_eq!(t, Utc.timestamp_opt(1_704_067_200, 500_000_000).unwrap());
    }

    #[test]
    fn unknown_filetimes_are_absent() {
        assert_eq!(filetime_to_local(0), None);
        assert_eq!(filetime_to_local(u64::MAX), None);
    }

    #[test]
    fn attribute_letters() {
        assert_eq!(attribute_string(0x21), "RA");
        assert_eq!(attribute_string(0x16), "HSD");
        assert_eq!(attribute_string(0x80), "");
    }

    #[cfg(windows)]
    #[test]
    fn raw_record_maps_to_result() {
        let record = RawRecord {
            path: r"C:\Users\me\Report.Final.DOCX".into(),
            size: Some(2048),
            created: Some(FILETIME_UNIX_EPOCH + 10_000_000),
            modified: None,
            accessed: Some(0),
            attributes: Some(FILE_ATTRIBUTE_ARCHIVE),
        };
        let result = to_result(record);
        assert_eq!(result.filename, "Report.Final.DOCX");
        assert_eq!(result.extension.as_deref(), Some("docx"));
        assert_eq!(result.size, Some(2048));
        assert!(result.created.is_some());
        assert!(result.modified.is_none());
        assert!(result.accessed.is_none());
        assert_eq!(result.attributes.as_deref(), Some("A"));
    }

    #[test]
    fn load_failure_is_backend_init_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("Everything64.dll");
        match EverythingBackend::new(&path) {
            Err(InitError::BackendInit { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loading a missing library must fail"),
        }
    }
}
