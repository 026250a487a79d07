use std::time::Duration;

use radiodl_engine::{DownloaderConfig, ProxyConfig, ShowDownloader, ShowDownloaderBuilder};
use tracing::info;

use crate::cli::CliArgs;
use crate::error::AppError;

/// Map the command line onto the engine's configuration.
pub fn downloader_builder(args: &CliArgs) -> Result<ShowDownloaderBuilder, AppError> {
    if args.concurrency == 0 {
        return Err(AppError::InvalidInput(
            "Concurrency must be at least 1".to_string(),
        ));
    }
    if args.retries == 0 {
        return Err(AppError::InvalidInput(
            "Retries must be at least 1".to_string(),
        ));
    }

    let mut http = DownloaderConfig::builder()
        .with_timeout(Duration::from_secs(args.timeout))
        .with_connect_timeout(Duration::from_secs(args.connect_timeout));

    http = if args.no_proxy {
        info!("All proxy settings disabled (--no-proxy flag)");
        http.with_system_proxy(false)
    } else if let Some(proxy_url) = &args.proxy {
        http.with_proxy(ProxyConfig::from_url(proxy_url))
    } else {
        http
    };

    let mut builder = ShowDownloaderBuilder::new()
        .with_base_config(http.build())
        .cdn_base_url(args.cdn_base.clone())
        .download_concurrency(args.concurrency)
        .segment_max_attempts(args.retries)
        .overwrite(args.overwrite);

    if let Some(ffmpeg) = &args.ffmpeg {
        builder = builder.ffmpeg_path(ffmpeg.clone());
    }

    Ok(builder)
}

/// Build the downloader, failing early if ffmpeg cannot be found.
pub fn build_downloader(args: &CliArgs) -> Result<ShowDownloader, AppError> {
    Ok(downloader_builder(args)?.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_arguments_reach_config() {
        let args = CliArgs::try_parse_from([
            "radiodl",
            "https://example.com/show",
            "-j",
            "8",
            "--retries",
            "5",
            "--timeout",
            "12",
            "--no-proxy",
            "--overwrite",
        ])
        .unwrap();

        let config = downloader_builder(&args).unwrap().get_config();
        assert_eq!(config.scheduler_config.download_concurrency, 8);
        assert_eq!(config.fetcher_config.retry_policy.max_attempts, 5);
        assert_eq!(config.base.timeout, Duration::from_secs(12));
        assert!(!config.base.use_system_proxy);
        assert!(config.assembler_config.overwrite);
        assert!(config.assembler_config.ffmpeg_path.is_none());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let args =
            CliArgs::try_parse_from(["radiodl", "https://example.com/show", "-j", "0"]).unwrap();
        assert!(matches!(
            downloader_builder(&args),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_ffmpeg_is_fatal() {
        let args = CliArgs::try_parse_from([
            "radiodl",
            "https://example.com/show",
            "--ffmpeg",
            "/nonexistent/ffmpeg_12345",
        ])
        .unwrap();
        assert!(matches!(
            build_downloader(&args),
            Err(AppError::Download(radiodl_engine::RadioError::ToolNotFound { .. }))
        ));
    }
}
