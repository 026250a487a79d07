// Playlist Resolver: turns a show page (or a show/date/duration triple) into
// the ordered list of segment URLs.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};

use crate::hls::config::HlsResolverConfig;
use crate::{RadioError, Result};

pub static MASTER_PLAYLIST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+master\.m3u8\b"#).unwrap());

pub static MEDIA_PLAYLIST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+\.m3u8\b"#).unwrap());

/// The path must end in `.ts`; a query or fragment may follow. The trailing
/// delimiter is matched but not captured.
pub static SEGMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(https?://[^\s"'<>?#]+\.ts(?:[?#][^\s"'<>]*)?)(?:[\s"'<>]|$)"#).unwrap()
});

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Ten-second segments: six per minute.
const SEGMENTS_PER_MINUTE: u32 = 6;

/// Longest show that can be requested by show/date/duration.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// A show identified by name, broadcast date and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRequest {
    pub show: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
}

impl ShowRequest {
    /// Validate the triple. `date` must be a real calendar date in `YYYY-MM-DD` form.
    pub fn new(show: impl Into<String>, date: &str, duration_minutes: u32) -> Result<Self> {
        let show = show.into().trim().to_string();
        if show.is_empty() {
            return Err(RadioError::InvalidInput(
                "Show identifier must not be empty".to_string(),
            ));
        }
        if duration_minutes == 0 {
            return Err(RadioError::InvalidInput(
                "Show duration must be at least one minute".to_string(),
            ));
        }
        if duration_minutes > MAX_DURATION_MINUTES {
            return Err(RadioError::InvalidInput(format!(
                "Show duration of {duration_minutes} minutes exceeds the {MAX_DURATION_MINUTES} minute limit"
            )));
        }

        let date_str = date.trim();
        if !DATE_REGEX.is_match(date_str) {
            return Err(RadioError::InvalidInput(format!(
                "Invalid show date '{date}': expected YYYY-MM-DD"
            )));
        }
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            RadioError::InvalidInput(format!("Invalid show date '{date_str}': {e}"))
        })?;

        Ok(Self {
            show,
            date,
            duration_minutes,
        })
    }

    /// Number of segments a show of this length is split into.
    pub fn segment_count(&self) -> usize {
        (self.duration_minutes as usize) * (SEGMENTS_PER_MINUTE as usize) + 1
    }
}

/// Where the segment list comes from. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowSource {
    /// A show page that embeds the master playlist URL.
    Page(String),
    /// Segment URLs built directly against the CDN.
    Show(ShowRequest),
}

impl fmt::Display for ShowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowSource::Page(url) => write!(f, "{url}"),
            ShowSource::Show(req) => write!(
                f,
                "{} on {} ({} min)",
                req.show, req.date, req.duration_minutes
            ),
        }
    }
}

pub struct PlaylistResolver {
    http_client: Client,
    config: HlsResolverConfig,
}

impl PlaylistResolver {
    pub fn new(http_client: Client, config: HlsResolverConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub async fn resolve_source(&self, source: &ShowSource) -> Result<Vec<String>> {
        match source {
            ShowSource::Page(url) => self.resolve(url).await,
            ShowSource::Show(request) => Ok(self.construct(request)),
        }
    }

    /// Follow page -> master playlist -> media playlist and collect the segment URLs.
    pub async fn resolve(&self, page_url: &str) -> Result<Vec<String>> {
        let page = self.fetch_text(page_url).await?;
        let master_url = extract_first(&MASTER_PLAYLIST_REGEX, &page, "master playlist", page_url)?;
        debug!(url = %master_url, "Found master playlist");

        let master = self.fetch_text(&master_url).await?;
        let media_url = extract_first(&MEDIA_PLAYLIST_REGEX, &master, "media playlist", &master_url)?;
        debug!(url = %media_url, "Found media playlist");

        let media = self.fetch_text(&media_url).await?;
        let segments = extract_all(&SEGMENT_REGEX, &media);
        if segments.is_empty() {
            return Err(RadioError::resolution(format!(
                "No segment URLs found in {media_url}"
            )));
        }

        info!(count = segments.len(), "Resolved segment list");
        Ok(segments)
    }

    /// Build the segment URLs for a show without touching the network.
    pub fn construct(&self, request: &ShowRequest) -> Vec<String> {
        let base = self.config.cdn_base_url.trim_end_matches('/');
        let stream = format!("{}-{}.m4a", request.show, request.date.format("%Y-%m-%d"));
        let urls: Vec<String> = (1..=request.segment_count())
            .map(|index| format!("{base}/{stream}/segment{index}_0_a.ts"))
            .collect();

        info!(
            show = %request.show,
            date = %request.date,
            count = urls.len(),
            "Constructed segment list"
        );
        urls
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| RadioError::resolution(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RadioError::resolution(format!(
                "{url} returned status {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| RadioError::resolution(format!("Failed to read body of {url}: {e}")))
    }
}

fn extract_first(regex: &Regex, body: &str, what: &str, source_url: &str) -> Result<String> {
    regex
        .find(body)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            RadioError::resolution(format!(
                "No {what} URL found in {source_url}; the page layout may have changed"
            ))
        })
}

/// Every match in document order, preferring the first capture group when the
/// pattern has one.
fn extract_all(regex: &Regex, body: &str) -> Vec<String> {
    regex
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().to_string())
        .collect()
}
