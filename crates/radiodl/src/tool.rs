//! External media tool discovery and invocation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::{RadioError, Result};

pub const FFMPEG: &str = "ffmpeg";

/// A located ffmpeg executable.
#[derive(Debug, Clone)]
pub struct MediaTool {
    path: PathBuf,
}

impl MediaTool {
    /// Find ffmpeg, preferring a configured path over a PATH lookup.
    ///
    /// A configured path that does not exist is an error rather than a reason
    /// to fall back to PATH.
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        let path = match configured {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => {
                return Err(RadioError::tool_not_found(path.display().to_string()));
            }
            None => which::which(FFMPEG).map_err(|_| RadioError::tool_not_found(FFMPEG))?,
        };
        debug!(path = %path.display(), "Using media tool");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the tool to completion. A non-zero exit becomes an assembly error
    /// carrying the tool's stderr.
    pub async fn run<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        debug!(tool = %self.path.display(), ?args, "Running media tool");

        let output = Command::new(&self.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(RadioError::assembly(format!(
            "{} exited with {}: {}",
            self.path.display(),
            output.status,
            stderr.trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configured_path() {
        let err = MediaTool::locate(Some(Path::new("/nonexistent/ffmpeg_12345"))).unwrap_err();
        assert!(matches!(err, RadioError::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_assembly_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = crate::test_utils::fake_ffmpeg(dir.path(), "echo 'broken input' >&2\nexit 1");

        let tool = MediaTool::locate(Some(&script)).unwrap();
        let err = tool.run(["-i", "x"]).await.unwrap_err();
        match err {
            RadioError::Assembly(message) => assert!(message.contains("broken input")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
