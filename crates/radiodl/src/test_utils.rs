//! Helpers shared by the unit tests.

use std::path::{Path, PathBuf};

/// Macro to initialize tracing for tests
///
/// Usage:
/// - `init_test_tracing!()` - uses DEBUG level (default)
/// - `init_test_tracing!(INFO)` - uses specified level
#[macro_export]
macro_rules! init_test_tracing {
    () => {
        $crate::init_test_tracing!(DEBUG);
    };
    ($level:ident) => {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::$level)
            .with_test_writer()
            .try_init();
    };
}

/// Write an executable `/bin/sh` script named `ffmpeg` into `dir`.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("ffmpeg");
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// A fake ffmpeg that appends its arguments to `log` and creates the file
/// named by its last argument.
#[cfg(unix)]
pub fn recording_ffmpeg(dir: &Path, log: &Path) -> PathBuf {
    fake_ffmpeg(
        dir,
        &format!(
            "echo \"$@\" >> '{}'\nfor last; do :; done\ntouch \"$last\"",
            log.display()
        ),
    )
}
