use std::path::PathBuf;

use crate::DownloaderConfig;
use crate::retry::RetryPolicy;

/// Default CDN path under which on-demand shows are published.
pub const DEFAULT_CDN_BASE_URL: &str = "http://abcradiomodhls.abc-cdn.net.au/i/triplej/audio";

// --- Top-Level Configuration ---
#[derive(Debug, Clone)]
pub struct HlsConfig {
    /// Base HTTP configuration
    pub base: DownloaderConfig,
    pub resolver_config: HlsResolverConfig,
    pub scheduler_config: HlsSchedulerConfig,
    pub fetcher_config: HlsFetcherConfig,
    pub assembler_config: HlsAssemblerConfig,
    /// Directory under which the per-run working directory is created
    pub work_root: PathBuf,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            base: DownloaderConfig::default(),
            resolver_config: HlsResolverConfig::default(),
            scheduler_config: HlsSchedulerConfig::default(),
            fetcher_config: HlsFetcherConfig::default(),
            assembler_config: HlsAssemblerConfig::default(),
            work_root: std::env::temp_dir(),
        }
    }
}

// --- Resolver Configuration ---
#[derive(Debug, Clone)]
pub struct HlsResolverConfig {
    /// Base used when segment URLs are built from show/date/duration
    pub cdn_base_url: String,
}

impl Default for HlsResolverConfig {
    fn default() -> Self {
        Self {
            cdn_base_url: DEFAULT_CDN_BASE_URL.to_string(),
        }
    }
}

// --- Scheduler Configuration ---
#[derive(Debug, Clone)]
pub struct HlsSchedulerConfig {
    pub download_concurrency: usize, // Max concurrent segment downloads
}

impl Default for HlsSchedulerConfig {
    fn default() -> Self {
        Self {
            download_concurrency: 4,
        }
    }
}

// --- Fetcher Configuration ---
#[derive(Debug, Clone, Default)]
pub struct HlsFetcherConfig {
    pub retry_policy: RetryPolicy,
}

// --- Assembler Configuration ---
#[derive(Debug, Clone, Default)]
pub struct HlsAssemblerConfig {
    /// Explicit ffmpeg location; looked up on PATH when unset
    pub ffmpeg_path: Option<PathBuf>,
    /// Replace an existing output file instead of failing
    pub overwrite: bool,
}
