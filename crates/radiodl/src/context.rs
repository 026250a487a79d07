//! Per-run state: the scratch directory, the HTTP client and the run's span.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tempfile::TempDir;
use tracing::{Span, debug, info, info_span};

use crate::Result;

const WORK_DIR_NAME: &str = "radiodl";
const MANIFEST_FILE: &str = "concat.txt";
const INTERMEDIATE_FILE: &str = "concat.ts";

/// Owns everything a single download run needs.
///
/// The working directory lives under `<work_root>/radiodl/<8 random chars>`
/// and is deleted when the context is closed or dropped, whichever comes
/// first. Every component logs inside [`RunContext::span`] so log lines from
/// concurrent runs can be told apart.
pub struct RunContext {
    work_dir: TempDir,
    client: Client,
    span: Span,
}

impl RunContext {
    pub fn create(work_root: &Path, client: Client) -> Result<Self> {
        let parent = work_root.join(WORK_DIR_NAME);
        std::fs::create_dir_all(&parent)?;

        let work_dir = tempfile::Builder::new()
            .prefix("")
            .rand_bytes(8)
            .tempdir_in(&parent)?;

        let run_id = work_dir
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let span = info_span!("run", id = %run_id);

        span.in_scope(|| {
            info!(
                path = %work_dir.path().display(),
                "Temporary working directory created"
            );
        });

        Ok(Self {
            work_dir,
            client,
            span,
        })
    }

    pub fn work_dir(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn segment_path(&self, file_name: &str) -> PathBuf {
        self.work_dir.path().join(file_name)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir.path().join(MANIFEST_FILE)
    }

    pub fn intermediate_path(&self) -> PathBuf {
        self.work_dir.path().join(INTERMEDIATE_FILE)
    }

    /// Remove the working directory now, surfacing any I/O error.
    pub fn close(self) -> Result<()> {
        let path = self.work_dir.path().to_path_buf();
        let _guard = self.span.enter();
        self.work_dir.close()?;
        debug!(path = %path.display(), "Temporary working directory removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_close_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let ctx = RunContext::create(root.path(), Client::new()).unwrap();

        let work_dir = ctx.work_dir().to_path_buf();
        assert!(work_dir.is_dir());
        assert!(work_dir.starts_with(root.path().join(WORK_DIR_NAME)));
        assert_eq!(work_dir.file_name().unwrap().len(), 8);
        assert_eq!(ctx.manifest_path(), work_dir.join("concat.txt"));
        assert_eq!(ctx.intermediate_path(), work_dir.join("concat.ts"));

        std::fs::write(ctx.segment_path("segment1.ts"), b"data").unwrap();
        ctx.close().unwrap();
        assert!(!work_dir.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let work_dir = {
            let ctx = RunContext::create(root.path(), Client::new()).unwrap();
            std::fs::write(ctx.segment_path("segment1.ts"), b"data").unwrap();
            ctx.work_dir().to_path_buf()
        };
        assert!(!work_dir.exists());
    }

    #[test]
    fn test_each_run_gets_its_own_directory() {
        let root = tempfile::tempdir().unwrap();
        let first = RunContext::create(root.path(), Client::new()).unwrap();
        let second = RunContext::create(root.path(), Client::new()).unwrap();
        assert_ne!(first.work_dir(), second.work_dir());
    }
}
