//! Windows console setup

use tracing::debug;
use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;
use windows_sys::Win32::System::Console::{
    ENABLE_VIRTUAL_TERMINAL_PROCESSING, GetConsoleMode, GetStdHandle, STD_OUTPUT_HANDLE,
    SetConsoleMode, SetConsoleOutputCP,
};

const CP_UTF8: u32 = 65001;

/// Switch the console to UTF-8 and enable VT escape processing.
///
/// Failures are ignored: when stdout is a pipe there is no console to set up.
pub fn configure_console() {
    unsafe {
        if SetConsoleOutputCP(CP_UTF8) == 0 {
            debug!("SetConsoleOutputCP failed, stdout is probably not a console");
        }

        let handle = GetStdHandle(STD_OUTPUT_HANDLE);
        if handle.is_null() || handle == INVALID_HANDLE_VALUE {
            return;
        }

        let mut mode = 0;
        if GetConsoleMode(handle, &mut mode) == 0 {
            return;
        }
        if SetConsoleMode(handle, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING) == 0 {
            debug!("SetConsoleMode failed");
        }
    }
}
