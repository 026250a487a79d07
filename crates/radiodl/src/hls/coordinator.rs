// Fetch Coordinator: runs the segment downloader over the whole playlist with
// bounded concurrency and hands back outcomes in playlist order.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tracing::debug;

use crate::hls::events::{OnProgress, ProgressEvent};
use crate::hls::fetcher::SegmentDownloader;
use crate::hls::segment::{FetchOutcome, Segment};

pub struct FetchCoordinator {
    downloader: Arc<dyn SegmentDownloader>,
    concurrency: usize,
    on_progress: Option<OnProgress>,
}

impl FetchCoordinator {
    pub fn new(downloader: Arc<dyn SegmentDownloader>, concurrency: usize) -> Self {
        Self {
            downloader,
            concurrency: concurrency.max(1),
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Option<OnProgress>) -> Self {
        self.on_progress = on_progress;
        self
    }

    /// Download every segment and return one outcome per input, index-aligned.
    ///
    /// Completion order is arbitrary; each result is dropped into the slot of
    /// its original position. A failing segment never cancels the others.
    pub async fn fetch_all(&self, segments: &[Segment]) -> Vec<FetchOutcome> {
        let mut slots: Vec<Option<FetchOutcome>> = vec![None; segments.len()];

        let mut completions = stream::iter(segments.iter().enumerate())
            .map(|(slot, segment)| async move {
                (slot, self.downloader.download_segment(segment).await)
            })
            .buffer_unordered(self.concurrency);

        while let Some((slot, outcome)) = completions.next().await {
            let segment = &segments[slot];
            debug!(index = segment.index, outcome = ?outcome, "Segment task finished");
            if let Some(on_progress) = &self.on_progress {
                on_progress(ProgressEvent::SegmentFinished {
                    index: segment.index,
                    url: segment.url.clone(),
                    succeeded: outcome.is_success(),
                });
            }
            slots[slot] = Some(outcome);
        }

        slots
            .into_iter()
            .map(|outcome| outcome.unwrap_or(FetchOutcome::Failed))
            .collect()
    }
}
