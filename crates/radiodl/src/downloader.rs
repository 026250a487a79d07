use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use tracing::{Instrument, info, warn};

use crate::context::RunContext;
use crate::hls::{
    Assembler, FetchCoordinator, FetchOutcome, HlsConfig, OnProgress, PlaylistResolver,
    ProgressEvent, Segment, SegmentFetcher, ShowSource,
};
use crate::tool::MediaTool;
use crate::{Result, create_client};

/// Downloads one show per [`ShowDownloader::run`] call:
/// resolve segment URLs, fetch them, hand them to ffmpeg, clean up.
pub struct ShowDownloader {
    client: Client,
    config: HlsConfig,
    tool: MediaTool,
    on_progress: Option<OnProgress>,
}

impl ShowDownloader {
    /// Locate the media tool and build the HTTP client.
    ///
    /// A missing ffmpeg fails here, before any request is made.
    pub fn new(config: HlsConfig) -> Result<Self> {
        let tool = MediaTool::locate(config.assembler_config.ffmpeg_path.as_deref())?;
        let client = create_client(&config.base)?;
        Ok(Self {
            client,
            config,
            tool,
            on_progress: None,
        })
    }

    pub fn with_progress(mut self, on_progress: OnProgress) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn config(&self) -> &HlsConfig {
        &self.config
    }

    pub fn tool(&self) -> &MediaTool {
        &self.tool
    }

    /// Download `source` into `output_dir` and return the path of the written file.
    ///
    /// The run's working directory is removed before returning, on success
    /// and on failure alike.
    pub async fn run(&self, source: &ShowSource, output_dir: &Path) -> Result<PathBuf> {
        let ctx = RunContext::create(&self.config.work_root, self.client.clone())?;
        let span = ctx.span().clone();

        let result = self
            .run_in_context(&ctx, source, output_dir)
            .instrument(span.clone())
            .await;

        if let Err(e) = ctx.close() {
            span.in_scope(|| warn!(error = %e, "Failed to remove working directory"));
        }
        result
    }

    async fn run_in_context(
        &self,
        ctx: &RunContext,
        source: &ShowSource,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let start_time = Instant::now();
        info!(%source, "Starting download");

        let resolver =
            PlaylistResolver::new(ctx.client().clone(), self.config.resolver_config.clone());
        let urls = resolver.resolve_source(source).await?;

        let assembler = Assembler::new(self.tool.clone(), self.config.assembler_config.clone())
            .with_progress(self.on_progress.clone());
        if let Some(first_url) = urls.first() {
            assembler.ensure_output_available(first_url, output_dir).await?;
        }

        let mut segments = Segment::from_urls(&urls);
        self.emit(ProgressEvent::SegmentsResolved {
            total: segments.len(),
        });

        let fetcher = Arc::new(SegmentFetcher::new(
            ctx.client().clone(),
            self.config.fetcher_config.retry_policy.clone(),
            ctx.work_dir(),
        ));
        let outcomes = FetchCoordinator::new(fetcher, self.config.scheduler_config.download_concurrency)
            .with_progress(self.on_progress.clone())
            .fetch_all(&segments)
            .await;

        let not_found = outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::NotFound))
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Failed))
            .count();
        for (segment, outcome) in segments.iter_mut().zip(outcomes) {
            segment.apply(outcome);
        }
        info!(
            total = segments.len(),
            downloaded = segments.len() - not_found - failed,
            not_found,
            failed,
            "Segment downloads finished"
        );

        let output = assembler
            .assemble(
                &segments,
                &ctx.manifest_path(),
                &ctx.intermediate_path(),
                output_dir,
            )
            .await?;

        info!(
            output = %output.display(),
            elapsed = ?start_time.elapsed(),
            "Completed successfully"
        );
        self.emit(ProgressEvent::Finished {
            output: output.clone(),
        });
        Ok(output)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(event);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::hls::ShowRequest;
    use crate::retry::RetryPolicy;
    use crate::{RadioError, ShowDownloaderBuilder};
    use std::time::Duration;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn work_dirs_left(work_root: &Path) -> usize {
        std::fs::read_dir(work_root.join("radiodl"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    fn downloader(server: &MockServer, scratch: &Path, ffmpeg: PathBuf) -> ShowDownloader {
        ShowDownloaderBuilder::new()
            .cdn_base_url(format!("{}/audio", server.uri()))
            .retry_policy(RetryPolicy::immediate(2))
            .download_concurrency(3)
            .ffmpeg_path(ffmpeg)
            .work_root(scratch.join("tmp"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_constructed_show_end_to_end() {
        crate::init_test_tracing!();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/audio/fns-2018-05-18\.m4a/segment[1-6]_0_a\.ts$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x47; 188]))
            .expect(6)
            .mount(&server)
            .await;
        // The estimated trailing segment does not exist.
        Mock::given(method("GET"))
            .and(path("/audio/fns-2018-05-18.m4a/segment7_0_a.ts"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let scratch = tempfile::tempdir().unwrap();
        let log = scratch.path().join("calls.log");
        let ffmpeg = crate::test_utils::recording_ffmpeg(scratch.path(), &log);
        let downloader = downloader(&server, scratch.path(), ffmpeg);

        let source = ShowSource::Show(ShowRequest::new("fns", "2018-05-18", 1).unwrap());
        let output_dir = scratch.path().join("out");
        let output = downloader.run(&source, &output_dir).await.unwrap();

        assert_eq!(output, output_dir.join("fns-2018-05-18.m4a"));
        assert!(output.exists());
        assert_eq!(std::fs::read_to_string(&log).unwrap().lines().count(), 2);
        assert_eq!(work_dirs_left(&scratch.path().join("tmp")), 0);
    }

    #[tokio::test]
    async fn test_work_dir_removed_when_every_segment_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(7 * 2)
            .mount(&server)
            .await;

        let scratch = tempfile::tempdir().unwrap();
        let marker = scratch.path().join("invoked");
        let ffmpeg = crate::test_utils::fake_ffmpeg(
            scratch.path(),
            &format!("touch '{}'", marker.display()),
        );
        let downloader = downloader(&server, scratch.path(), ffmpeg);

        let source = ShowSource::Show(ShowRequest::new("fns", "2018-05-18", 1).unwrap());
        let err = downloader
            .run(&source, &scratch.path().join("out"))
            .await
            .unwrap_err();

        assert!(matches!(err, RadioError::Assembly(_)));
        assert!(!marker.exists());
        assert_eq!(work_dirs_left(&scratch.path().join("tmp")), 0);
    }

    #[tokio::test]
    async fn test_work_dir_removed_when_resolution_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/program"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let scratch = tempfile::tempdir().unwrap();
        let ffmpeg = crate::test_utils::fake_ffmpeg(scratch.path(), "exit 0");
        let downloader = downloader(&server, scratch.path(), ffmpeg);

        let source = ShowSource::Page(format!("{}/program", server.uri()));
        let err = downloader
            .run(&source, &scratch.path().join("out"))
            .await
            .unwrap_err();

        assert!(matches!(err, RadioError::Resolution(_)));
        assert_eq!(work_dirs_left(&scratch.path().join("tmp")), 0);
    }

    #[tokio::test]
    async fn test_existing_output_stops_before_fetching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/audio/fns-2018-05-18\.m4a/segment\d+_0_a\.ts$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x47; 188]))
            .expect(0)
            .mount(&server)
            .await;

        let scratch = tempfile::tempdir().unwrap();
        let marker = scratch.path().join("invoked");
        let ffmpeg = crate::test_utils::fake_ffmpeg(
            scratch.path(),
            &format!("touch '{}'", marker.display()),
        );
        let downloader = downloader(&server, scratch.path(), ffmpeg);

        let output_dir = scratch.path().join("out");
        std::fs::create_dir_all(&output_dir).unwrap();
        std::fs::write(output_dir.join("fns-2018-05-18.m4a"), b"earlier run").unwrap();

        let source = ShowSource::Show(ShowRequest::new("fns", "2018-05-18", 1).unwrap());
        let err = downloader.run(&source, &output_dir).await.unwrap_err();

        assert!(matches!(err, RadioError::Assembly(_)));
        assert!(!marker.exists());
        assert_eq!(
            std::fs::read(output_dir.join("fns-2018-05-18.m4a")).unwrap(),
            b"earlier run"
        );
        assert_eq!(work_dirs_left(&scratch.path().join("tmp")), 0);
    }

    #[tokio::test]
    async fn test_dropping_run_mid_fetch_removes_work_dir() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0x47; 188])
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let scratch = tempfile::tempdir().unwrap();
        let ffmpeg = crate::test_utils::fake_ffmpeg(scratch.path(), "exit 0");
        let downloader = downloader(&server, scratch.path(), ffmpeg);
        let work_root = scratch.path().join("tmp");

        let source = ShowSource::Show(ShowRequest::new("fns", "2018-05-18", 1).unwrap());
        let output_dir = scratch.path().join("out");
        let mut run = Box::pin(downloader.run(&source, &output_dir));

        let in_flight = tokio::select! {
            _ = &mut run => panic!("run finished while segments were still delayed"),
            _ = tokio::time::sleep(Duration::from_millis(300)) => work_dirs_left(&work_root),
        };
        assert_eq!(in_flight, 1);

        // Same path as Ctrl-C in the binary: the run future is dropped.
        drop(run);
        assert_eq!(work_dirs_left(&work_root), 0);
        assert!(!output_dir.join("fns-2018-05-18.m4a").exists());
    }

    #[tokio::test]
    async fn test_missing_tool_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let scratch = tempfile::tempdir().unwrap();
        let result = ShowDownloaderBuilder::new()
            .cdn_base_url(format!("{}/audio", server.uri()))
            .ffmpeg_path(scratch.path().join("no-ffmpeg-here"))
            .work_root(scratch.path().join("tmp"))
            .build();

        assert!(matches!(result, Err(RadioError::ToolNotFound { .. })));
        assert_eq!(work_dirs_left(&scratch.path().join("tmp")), 0);
    }
}
