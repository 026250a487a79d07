use clap::Parser;
use radiodl_engine::hls::config::DEFAULT_CDN_BASE_URL;
use radiodl_engine::{ShowRequest, ShowSource};
use std::path::PathBuf;

use crate::error::AppError;
use crate::utils::parse_minutes;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Download an on-demand radio show as a single audio file",
    long_about = "Downloads a radio show published as segmented HLS audio, joins the\n\
                  segments with ffmpeg and writes one seekable audio file.\n\
                  \n\
                  Either pass the show's page URL, or identify the show with\n\
                  --show, --date and --duration to build the segment URLs directly."
)]
pub struct CliArgs {
    /// The page URL containing the program to download
    #[arg(help = "The page URL containing the program to download")]
    pub url: Option<String>,

    /// Where the output file will be written
    #[arg(help = "Where the output file will be written (default: your Downloads directory)")]
    pub output_dir: Option<PathBuf>,

    /// Show identifier as used in CDN paths (e.g. "fns")
    #[arg(short, long, help = "Show identifier used in the CDN path, e.g. \"fns\"")]
    pub show: Option<String>,

    /// Broadcast date
    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Broadcast date of the show")]
    pub date: Option<String>,

    /// Show length
    #[arg(
        short = 't',
        long,
        help = "Show length in minutes, or with a unit (s, m, h). Examples: \"180\", \"3h\""
    )]
    pub duration: Option<String>,

    /// Number of concurrent segment downloads
    #[arg(
        short = 'j',
        long,
        default_value = "4",
        help = "Maximum number of concurrent segment downloads"
    )]
    pub concurrency: usize,

    /// Attempts per segment
    #[arg(
        long,
        default_value = "3",
        help = "Total attempts per segment before giving up (404s are never retried)"
    )]
    pub retries: u32,

    /// Request timeout in seconds
    #[arg(
        long,
        default_value = "30",
        help = "Overall timeout in seconds for each HTTP request (0 disables it)"
    )]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value = "10",
        help = "Connection timeout in seconds (time to establish initial connection)"
    )]
    pub connect_timeout: u64,

    /// Path to ffmpeg
    #[arg(long, help = "Path to the ffmpeg executable (default: looked up on PATH)")]
    pub ffmpeg: Option<PathBuf>,

    /// CDN base for --show downloads
    #[arg(
        long,
        default_value = DEFAULT_CDN_BASE_URL,
        help = "Base URL under which show segments are published"
    )]
    pub cdn_base: String,

    /// Replace an existing output file
    #[arg(long, help = "Overwrite the output file if it already exists")]
    pub overwrite: bool,

    /// Proxy URL (e.g., "http://proxy.example.com:8080")
    #[arg(
        long,
        help = "Proxy server URL for downloads (e.g., \"http://proxy.example.com:8080\" or \"socks5://host:1080\")"
    )]
    pub proxy: Option<String>,

    /// Disable all proxy settings for downloads
    #[arg(
        long,
        conflicts_with = "proxy",
        help = "Disable all proxy settings (including system proxy) for downloads"
    )]
    pub no_proxy: bool,

    /// Log file
    #[arg(long, default_value = "radiodl.log", help = "File that receives a copy of the log")]
    pub log_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    /// Show progress bars
    #[arg(short = 'P', long = "progress", help = "Show a progress bar while downloading")]
    pub show_progress: bool,
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

impl CliArgs {
    /// Decide what to download and where to.
    ///
    /// With `--show`/`--date`/`--duration` the first positional may hold the
    /// output directory, since there is no URL to take its place.
    pub fn resolve_inputs(&self) -> Result<(ShowSource, Option<PathBuf>), AppError> {
        let show_flags = self.show.is_some() || self.date.is_some() || self.duration.is_some();

        let (url, output_dir) = match (&self.url, &self.output_dir) {
            (Some(first), None) if show_flags && !is_http_url(first) => {
                (None, Some(PathBuf::from(first)))
            }
            _ => (self.url.clone(), self.output_dir.clone()),
        };

        if let Some(url) = url {
            if show_flags {
                return Err(AppError::InvalidInput(
                    "A URL cannot be combined with --show, --date or --duration".to_string(),
                ));
            }
            if !is_http_url(&url) {
                return Err(AppError::InvalidInput(format!(
                    "'{url}' is not an http(s) URL"
                )));
            }
            return Ok((ShowSource::Page(url), output_dir));
        }

        let (Some(show), Some(date), Some(duration)) = (&self.show, &self.date, &self.duration)
        else {
            return Err(AppError::InvalidInput(
                "Either a page URL or all of --show, --date and --duration are required"
                    .to_string(),
            ));
        };

        let minutes = parse_minutes(duration)?;
        let request = ShowRequest::new(show.as_str(), date, minutes)?;
        Ok((ShowSource::Show(request), output_dir))
    }
}
