//! Subprocess execution shared by the mdfind and locate backends

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use super::SearchError;
use super::translate::Invocation;

/// Run the invocation with `program` as the binary and capture its output.
///
/// A binary that is missing or cannot be started is a [`SearchError::Spawn`].
pub fn run(program: &Path, invocation: &Invocation) -> Result<Output, SearchError> {
    debug!("Running {} {:?}", program.display(), invocation.args);

    Command::new(program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| SearchError::Spawn {
            program: invocation.program,
            source,
        })
}

/// Error for a process that exited unsuccessfully
pub fn failure(invocation: &Invocation, output: &Output) -> SearchError {
    SearchError::Failed {
        program: invocation.program,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Split captured stdout into non-empty path lines.
///
/// Lines are kept as raw bytes so that names which are not valid UTF-8
/// still refer to the file on disk.
pub fn lines(stdout: &[u8]) -> Vec<PathBuf> {
    stdout
        .split(|&b| b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .filter(|l| !l.is_empty())
        .map(path_from_bytes)
        .collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_drop_blanks_and_carriage_returns() {
        let out = b"/a/one.txt\r\n\n/b/two.txt\n";
        assert_eq!(
            lines(out),
            vec![PathBuf::from("/a/one.txt"), PathBuf::from("/b/two.txt")]
        );
        assert!(lines(b"").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn lines_keep_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let paths = lines(b"/tmp/caf\xe9.txt\n");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].as_os_str().as_bytes(), b"/tmp/caf\xe9.txt");
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let inv = Invocation {
            program: "universal-search-no-such-binary",
            args: vec![],
        };
        let err = run(Path::new(inv.program), &inv).unwrap_err();
        assert!(matches!(
            err,
            SearchError::Spawn {
                program: "universal-search-no-such-binary",
                ..
            }
        ));
        assert!(err.is_execution());
    }

    #[cfg(unix)]
    #[test]
    fn output_is_fully_captured() {
        let inv = Invocation {
            program: "sh",
            args: vec!["-c".into(), "printf '/x/a\\n/x/b\\n'; echo oops >&2; exit 3".into()],
        };
        let output = run(Path::new("sh"), &inv).unwrap();
        assert_eq!(lines(&output.stdout), vec![PathBuf::from("/x/a"), PathBuf::from("/x/b")]);
        assert_eq!(output.status.code(), Some(3));

        let err = failure(&inv, &output);
        assert_eq!(err.to_string(), "sh failed (exit status: 3): oops");
        match err {
            SearchError::Failed {
                program,
                status,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(status, "exit status: 3");
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
