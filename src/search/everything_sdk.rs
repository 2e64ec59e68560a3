//! Runtime binding to the Everything SDK (Everything64.dll)
//!
//! The DLL talks to a running Everything service over IPC. All query state
//! lives inside the DLL and is process-global, so every query holds the
//! `api` lock from the first setter call until the last result is read.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use libloading::Library;
use tracing::debug;

use super::translate::EverythingRequest;

const EVERYTHING_REQUEST_FULL_PATH_AND_FILE_NAME: u32 = 0x0000_0004;
const EVERYTHING_REQUEST_SIZE: u32 = 0x0000_0010;
const EVERYTHING_REQUEST_DATE_CREATED: u32 = 0x0000_0020;
const EVERYTHING_REQUEST_DATE_MODIFIED: u32 = 0x0000_0040;
const EVERYTHING_REQUEST_DATE_ACCESSED: u32 = 0x0000_0080;
const EVERYTHING_REQUEST_ATTRIBUTES: u32 = 0x0000_0100;

const REQUEST_FLAGS: u32 = EVERYTHING_REQUEST_FULL_PATH_AND_FILE_NAME
    | EVERYTHING_REQUEST_SIZE
    | EVERYTHING_REQUEST_DATE_CREATED
    | EVERYTHING_REQUEST_DATE_MODIFIED
    | EVERYTHING_REQUEST_DATE_ACCESSED
    | EVERYTHING_REQUEST_ATTRIBUTES;

const INVALID_FILE_ATTRIBUTES: u32 = 0xFFFF_FFFF;

/// Longest extended-length Windows path, in UTF-16 units
const PATH_BUFFER_LEN: usize = 32_768;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct FileTime {
    low: u32,
    high: u32,
}

impl FileTime {
    fn ticks(self) -> u64 {
        (u64::from(self.high) << 32) | u64::from(self.low)
    }
}

type SetSearchW = unsafe extern "system" fn(*const u16);
type SetFlag = unsafe extern "system" fn(i32);
type SetDword = unsafe extern "system" fn(u32);
type QueryW = unsafe extern "system" fn(i32) -> i32;
type GetDword = unsafe extern "system" fn() -> u32;
type CleanUp = unsafe extern "system" fn();
type GetResultFullPathNameW = unsafe extern "system" fn(u32, *mut u16, u32) -> u32;
type GetResultSize = unsafe extern "system" fn(u32, *mut i64) -> i32;
type GetResultDate = unsafe extern "system" fn(u32, *mut FileTime) -> i32;
type GetResultAttributes = unsafe extern "system" fn(u32) -> u32;

/// Function pointers resolved from the DLL
struct Api {
    set_search: SetSearchW,
    set_match_path: SetFlag,
    set_match_case: SetFlag,
    set_match_whole_word: SetFlag,
    set_regex: SetFlag,
    set_max: SetDword,
    set_offset: SetDword,
    set_sort: SetDword,
    set_request_flags: SetDword,
    query: QueryW,
    get_last_error: GetDword,
    get_num_results: GetDword,
    clean_up: CleanUp,
    get_full_path: GetResultFullPathNameW,
    get_size: GetResultSize,
    get_date_created: GetResultDate,
    get_date_modified: GetResultDate,
    get_date_accessed: GetResultDate,
    get_attributes: GetResultAttributes,
}

/// Resolve one exported symbol and copy the function pointer out
unsafe fn symbol<T: Copy>(lib: &Library, name: &[u8]) -> Result<T, libloading::Error> {
    let sym = unsafe { lib.get::<T>(name)? };
    Ok(*sym)
}

impl Api {
    unsafe fn load(lib: &Library) -> Result<Self, libloading::Error> {
        unsafe {
            Ok(Self {
                set_search: symbol(lib, b"Everything_SetSearchW\0")?,
                set_match_path: symbol(lib, b"Everything_SetMatchPath\0")?,
                set_match_case: symbol(lib, b"Everything_SetMatchCase\0")?,
                set_match_whole_word: symbol(lib, b"Everything_SetMatchWholeWord\0")?,
                set_regex: symbol(lib, b"Everything_SetRegex\0")?,
                set_max: symbol(lib, b"Everything_SetMax\0")?,
                set_offset: symbol(lib, b"Everything_SetOffset\0")?,
                set_sort: symbol(lib, b"Everything_SetSort\0")?,
                set_request_flags: symbol(lib, b"Everything_SetRequestFlags\0")?,
                query: symbol(lib, b"Everything_QueryW\0")?,
                get_last_error: symbol(lib, b"Everything_GetLastError\0")?,
                get_num_results: symbol(lib, b"Everything_GetNumResults\0")?,
                clean_up: symbol(lib, b"Everything_CleanUp\0")?,
                get_full_path: symbol(lib, b"Everything_GetResultFullPathNameW\0")?,
                get_size: symbol(lib, b"Everything_GetResultSize\0")?,
                get_date_created: symbol(lib, b"Everything_GetResultDateCreated\0")?,
                get_date_modified: symbol(lib, b"Everything_GetResultDateModified\0")?,
                get_date_accessed: symbol(lib, b"Everything_GetResultDateAccessed\0")?,
                get_attributes: symbol(lib, b"Everything_GetResultAttributes\0")?,
            })
        }
    }
}

/// One result as reported by the SDK, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub path: String,
    pub size: Option<u64>,
    /// FILETIME ticks (100ns since 1601-01-01 UTC)
    pub created: Option<u64>,
    pub modified: Option<u64>,
    pub accessed: Option<u64>,
    pub attributes: Option<u32>,
}

/// Loaded Everything SDK library
pub struct EverythingSdk {
    // Declared before `_lib` so the pointers are dropped before the library.
    api: Mutex<Api>,
    _lib: Library,
    path: PathBuf,
}

impl EverythingSdk {
    /// Load the DLL at `path` and resolve every function used by queries
    pub fn load(path: &Path) -> Result<Self, libloading::Error> {
        let lib = unsafe { Library::new(path)? };
        let api = unsafe { Api::load(&lib)? };
        debug!("Loaded Everything SDK from {:?}", path);

        Ok(Self {
            api: Mutex::new(api),
            _lib: lib,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run one query and read back all result rows
    pub fn query(&self, request: &EverythingRequest) -> Result<Vec<RawRecord>, String> {
        let api = self
            .api
            .lock()
            .map_err(|_| "Everything SDK lock poisoned".to_string())?;

        let search: Vec<u16> = request.search.encode_utf16().chain(std::iter::once(0)).collect();

        unsafe {
            (api.set_search)(search.as_ptr());
            (api.set_match_path)(request.match_path as i32);
            (api.set_match_case)(request.match_case as i32);
            (api.set_match_whole_word)(request.match_whole_word as i32);
            (api.set_regex)(request.regex as i32);
            (api.set_max)(request.max);
            (api.set_offset)(request.offset);
            (api.set_sort)(request.sort);
            (api.set_request_flags)(REQUEST_FLAGS);

            if (api.query)(1) == 0 {
                let code = (api.get_last_error)();
                return Err(error_name(code).to_string());
            }

            let count = (api.get_num_results)();
            let mut records = Vec::with_capacity(count as usize);
            let mut buf = vec![0u16; PATH_BUFFER_LEN];

            for index in 0..count {
                let len = (api.get_full_path)(index, buf.as_mut_ptr(), buf.len() as u32) as usize;
                if len == 0 {
                    continue;
                }
                let path = String::from_utf16_lossy(&buf[..len.min(buf.len())]);

                let mut size: i64 = 0;
                let size =
                    ((api.get_size)(index, &mut size) != 0 && size >= 0).then_some(size as u64);

                let date = |getter: GetResultDate| {
                    let mut ft = FileTime::default();
                    (getter(index, &mut ft) != 0).then(|| ft.ticks())
                };
                let created = date(api.get_date_created);
                let modified = date(api.get_date_modified);
                let accessed = date(api.get_date_accessed);

                let attrs = (api.get_attributes)(index);
                let attributes = (attrs != INVALID_FILE_ATTRIBUTES).then_some(attrs);

                records.push(RawRecord {
                    path,
                    size,
                    created,
                    modified,
                    accessed,
                    attributes,
                });
            }

            Ok(records)
        }
    }
}

impl Drop for EverythingSdk {
    fn drop(&mut self) {
        if let Ok(api) = self.api.lock() {
            unsafe { (api.clean_up)() };
        }
    }
}

/// Name of an `Everything_GetLastError` code
pub fn error_name(code: u32) -> &'static str {
    match code {
        0 => "EVERYTHING_OK",
        1 => "EVERYTHING_ERROR_MEMORY",
        2 => "EVERYTHING_ERROR_IPC (is the Everything service running?)",
        3 => "EVERYTHING_ERROR_REGISTERCLASSEX",
        4 => "EVERYTHING_ERROR_CREATEWINDOW",
        5 => "EVERYTHING_ERROR_CREATETHREAD",
        6 => "EVERYTHING_ERROR_INVALIDINDEX",
        7 => "EVERYTHING_ERROR_INVALIDCALL",
        8 => "EVERYTHING_ERROR_INVALIDREQUEST",
        9 => "EVERYTHING_ERROR_INVALIDPARAMETER",
        _ => "unknown Everything error",
    }
}
