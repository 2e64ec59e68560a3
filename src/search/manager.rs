//! Backend selection
//!
//! Picks the search backend for the running platform once at startup. The
//! resulting [`SearchBackend`] is owned by the caller and passed down to
//! whatever serves requests.

use tracing::info;

use crate::config::Config;
use crate::platform::Platform;

use super::{EverythingBackend, InitError, LocateBackend, MdfindBackend, SearchBackend};

/// Resolve the backend for the current OS
pub fn resolve(config: &Config) -> Result<SearchBackend, InitError> {
    resolve_for(Platform::current()?, config)
}

/// Build the backend for `platform`.
///
/// On Windows this loads the Everything SDK, so a missing or broken DLL is
/// reported here rather than on the first query.
pub fn resolve_for(platform: Platform, config: &Config) -> Result<SearchBackend, InitError> {
    let backend = match platform {
        Platform::MacOs => SearchBackend::Mdfind(MdfindBackend::new()),
        Platform::Linux => SearchBackend::Locate(LocateBackend::new()),
        Platform::Windows => {
            let sdk_path = config.sdk_path();
            info!("Loading Everything SDK from {:?}", sdk_path);
            SearchBackend::Everything(EverythingBackend::new(&sdk_path)?)
        }
    };

    info!("Search backend for {}: {}", platform, backend.status_description());
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use universal_search_core::BackendKind;

    #[test]
    fn unix_platforms_map_to_subprocess_backends() {
        let config = Config::default();
        assert_eq!(resolve_for(Platform::MacOs, &config).unwrap().kind(), BackendKind::Mdfind);
        assert_eq!(resolve_for(Platform::Linux, &config).unwrap().kind(), BackendKind::Locate);
    }

    #[test]
    fn unsupported_os_constructs_nothing() {
        let err = Platform::from_os_name("freebsd")
            .and_then(|p| resolve_for(p, &Config::default()))
            .err()
            .unwrap();
        assert!(matches!(err, InitError::UnsupportedPlatform(_)));
    }

    #[test]
    fn unloadable_sdk_is_an_init_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        let dll = dir.path().join("Everything64.dll");
        config.everything.sdk_path = Some(dll.to_string_lossy().into_owned());

        // EVERYTHING_SDK_PATH would take precedence over the config value
        if std::env::var_os(crate::config::SDK_PATH_ENV).is_none() {
            let err = resolve_for(Platform::Windows, &config).err().unwrap();
            assert!(matches!(err, InitError::BackendInit { .. }));
        }
    }

    #[test]
    fn backend_rejects_invalid_query_before_running() {
        let backend = resolve_for(Platform::Linux, &Config::default()).unwrap();
        let err = backend
            .search(&universal_search_core::SearchQuery::new("x").with_max_results(0))
            .unwrap_err();
        assert!(!err.is_execution());
    }
}
