use std::path::PathBuf;
use std::time::Duration;

use crate::hls::HlsConfig;
use crate::retry::RetryPolicy;
use crate::{DownloaderConfig, Result, ShowDownloader};

/// Fluent construction of a [`ShowDownloader`].
pub struct ShowDownloaderBuilder {
    config: HlsConfig,
}

impl ShowDownloaderBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: HlsConfig::default(),
        }
    }

    pub fn with_base_config(mut self, base_config: DownloaderConfig) -> Self {
        self.config.base = base_config;
        self
    }

    // --- Base DownloaderConfig methods ---

    /// Set overall HTTP timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.base.timeout = timeout;
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.base.connect_timeout = timeout;
        self
    }

    // --- Resolver ---

    /// Set the CDN base used for show/date/duration downloads
    pub fn cdn_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.resolver_config.cdn_base_url = url.into();
        self
    }

    // --- Scheduler / fetcher ---

    /// Set the number of segments downloaded at once
    pub fn download_concurrency(mut self, concurrency: usize) -> Self {
        self.config.scheduler_config.download_concurrency = concurrency;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.fetcher_config.retry_policy = policy;
        self
    }

    /// Set the total number of attempts per segment
    pub fn segment_max_attempts(mut self, attempts: u32) -> Self {
        self.config.fetcher_config.retry_policy.max_attempts = attempts.max(1);
        self
    }

    // --- Assembler ---

    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.assembler_config.ffmpeg_path = Some(path.into());
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.assembler_config.overwrite = overwrite;
        self
    }

    /// Set the directory that holds per-run working directories
    pub fn work_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.work_root = path.into();
        self
    }

    pub fn get_config(&self) -> HlsConfig {
        self.config.clone()
    }

    pub fn build(self) -> Result<ShowDownloader> {
        ShowDownloader::new(self.config)
    }
}

impl Default for ShowDownloaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
