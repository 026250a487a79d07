use std::path::PathBuf;
use std::sync::Arc;

/// Progress notifications emitted while a show is downloaded.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The segment list is known.
    SegmentsResolved { total: usize },
    /// One segment finished, in whatever order the pool completes them.
    SegmentFinished {
        index: usize,
        url: String,
        succeeded: bool,
    },
    /// The media tool is joining the segments.
    Concatenating { segments: usize },
    /// The media tool is writing the final container.
    Repackaging { output: PathBuf },
    Finished { output: PathBuf },
}

/// A callback function for progress updates.
pub type OnProgress = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
