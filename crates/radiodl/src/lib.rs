//! # radiodl
//!
//! Downloads on-demand radio shows published as segmented HLS audio and
//! repackages them into a single seekable file.
//!
//! ## Pipeline
//!
//! - Resolve the segment list, either by following a show page through its
//!   master and media playlists or by building CDN URLs for a show, date and
//!   duration
//! - Fetch segments with bounded concurrency and per-segment retry
//! - Join the downloaded segments with ffmpeg, in playlist order
//!
//! Each run works inside its own temporary directory, which is removed when
//! the run ends.

pub mod builder;
pub mod client;
pub mod config;
pub mod context;
pub mod downloader;
pub mod error;
pub mod hls;
pub mod protocol_builder;
pub mod proxy;
pub mod retry;
pub mod tool;

#[cfg(test)]
pub(crate) mod test_utils;

pub use builder::DownloaderConfigBuilder;
pub use client::create_client;
pub use config::DownloaderConfig;
pub use context::RunContext;
pub use downloader::ShowDownloader;
pub use error::{RadioError, Result};
pub use protocol_builder::ShowDownloaderBuilder;
pub use retry::RetryPolicy;
pub use tool::MediaTool;

pub use hls::{FetchOutcome, OnProgress, ProgressEvent, Segment, ShowRequest, ShowSource};

// Re-export proxy utilities
pub use proxy::{ProxyAuth, ProxyConfig, ProxyType};
