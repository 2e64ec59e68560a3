//! Platform detection and platform-specific setup

#[cfg(windows)]
pub mod windows;

use std::fmt;

use crate::search::InitError;

/// Operating systems with a search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Result<Self, InitError> {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map an OS identifier (`std::env::consts::OS` or a kernel name) to a platform
    pub fn from_os_name(name: &str) -> Result<Self, InitError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" => Ok(Platform::MacOs),
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            _ => Err(InitError::UnsupportedPlatform(name.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macos"),
            Platform::Linux => write!(f, "linux"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

/// Prepare the console for UTF-8 output (no-op outside Windows)
pub fn configure_console() {
    #[cfg(windows)]
    windows::configure_console();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_identifiers() {
        assert_eq!(Platform::from_os_name("macos").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_os_name("Darwin").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_os_name("Linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os_name("windows").unwrap(), Platform::Windows);
    }

    #[test]
    fn unknown_identifier_is_unsupported() {
        let err = Platform::from_os_name("SunOS").unwrap_err();
        assert!(matches!(err, InitError::UnsupportedPlatform(ref name) if name == "SunOS"));
    }

    #[test]
    fn current_platform_resolves_on_supported_hosts() {
        if cfg!(any(target_os = "macos", target_os = "linux", windows)) {
            assert!(Platform::current().is_ok());
        }
    }
}
