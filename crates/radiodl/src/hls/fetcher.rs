// Segment Fetcher: downloads one segment with retry logic and stores it in the
// run's working directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use crate::hls::segment::{FetchOutcome, Segment};
use crate::retry::RetryPolicy;

#[async_trait]
pub trait SegmentDownloader: Send + Sync {
    /// Fetch a segment. Failures are reported through the outcome, never as an error.
    async fn download_segment(&self, segment: &Segment) -> FetchOutcome;
}

enum FetchFailure {
    NotFound,
    Exhausted(String),
}

pub struct SegmentFetcher {
    http_client: Client,
    retry_policy: RetryPolicy,
    output_dir: PathBuf,
}

impl SegmentFetcher {
    pub fn new(http_client: Client, retry_policy: RetryPolicy, output_dir: &Path) -> Self {
        Self {
            http_client,
            retry_policy,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Fetches a segment body, retrying everything except a 404.
    async fn fetch_with_retries(&self, url: &str) -> Result<Bytes, FetchFailure> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let failure = match self.http_client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.bytes().await {
                            Ok(body) => return Ok(body),
                            Err(e) => format!("failed to read body: {e}"),
                        }
                    } else if status == StatusCode::NOT_FOUND {
                        return Err(FetchFailure::NotFound);
                    } else {
                        format!("status {status}")
                    }
                }
                Err(e) => format!("network error: {e}"),
            };

            if !self.retry_policy.should_retry(attempt) {
                return Err(FetchFailure::Exhausted(format!(
                    "gave up after {attempt} attempts, last failure: {failure}"
                )));
            }

            let delay = self.retry_policy.delay_for(attempt);
            debug!(
                url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Segment request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SegmentDownloader for SegmentFetcher {
    async fn download_segment(&self, segment: &Segment) -> FetchOutcome {
        info!(index = segment.index, url = %segment.url, "Downloading segment");

        let body = match self.fetch_with_retries(&segment.url).await {
            Ok(body) => body,
            Err(FetchFailure::NotFound) => {
                warn!(url = %segment.url, "Segment returned 404; continuing without it");
                return FetchOutcome::NotFound;
            }
            Err(FetchFailure::Exhausted(reason)) => {
                error!(url = %segment.url, %reason, "Exceeded retries downloading segment");
                return FetchOutcome::Failed;
            }
        };

        let path = self.output_dir.join(segment.file_name());
        if let Err(e) = tokio::fs::write(&path, &body).await {
            error!(path = %path.display(), error = %e, "Failed to store segment");
            let _ = tokio::fs::remove_file(&path).await;
            return FetchOutcome::Failed;
        }

        debug!(bytes = body.len(), path = %path.display(), "Segment stored");
        FetchOutcome::Success(path)
    }
}
