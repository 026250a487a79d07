// Segmented HLS show download: resolve, fetch, assemble.

pub mod assembler;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod fetcher;
pub mod resolver;
pub mod segment;

// Re-exports for easier access
pub use assembler::Assembler;
pub use config::HlsConfig;
pub use coordinator::FetchCoordinator;
pub use events::{OnProgress, ProgressEvent};
pub use fetcher::{SegmentDownloader, SegmentFetcher};
pub use resolver::{PlaylistResolver, ShowRequest, ShowSource};
pub use segment::{FetchOutcome, Segment};
