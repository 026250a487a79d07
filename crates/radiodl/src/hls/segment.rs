use std::path::{Path, PathBuf};

use url::Url;

/// Result of fetching a single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The segment body was written to this path.
    Success(PathBuf),
    /// The server answered 404; the segment does not exist.
    NotFound,
    /// Retries were exhausted or the body could not be stored.
    Failed,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// One entry of the resolved segment list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position in the playlist
    pub index: usize,
    pub url: String,
    pub path: Option<PathBuf>,
    pub present: bool,
}

impl Segment {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
            path: None,
            present: false,
        }
    }

    /// Build the segment list for an ordered set of URLs.
    pub fn from_urls(urls: &[String]) -> Vec<Segment> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| Segment::new(i + 1, url.clone()))
            .collect()
    }

    /// Record the fetch outcome for this segment.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Success(path) => {
                self.path = Some(path);
                self.present = true;
            }
            FetchOutcome::NotFound | FetchOutcome::Failed => {
                self.path = None;
                self.present = false;
            }
        }
    }

    /// Local path, only for segments that were downloaded.
    pub fn local_path(&self) -> Option<&Path> {
        if self.present {
            self.path.as_deref()
        } else {
            None
        }
    }

    /// File name used on disk: the last path segment of the URL.
    pub fn file_name(&self) -> String {
        segment_file_name(&self.url).unwrap_or_else(|| format!("segment_{}.ts", self.index))
    }
}

/// Last non-empty path segment of a URL.
pub fn segment_file_name(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(str::to_string)
}

/// Second-to-last path segment of a URL, which the CDN uses for the show name.
pub fn show_identifier(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[segments.len() - 2].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str =
        "http://abcradiomodhls.abc-cdn.net.au/i/triplej/audio/fns-2018-05-18.m4a/segment12_0_a.ts";

    #[test]
    fn test_names_from_url() {
        assert_eq!(segment_file_name(URL).as_deref(), Some("segment12_0_a.ts"));
        assert_eq!(show_identifier(URL).as_deref(), Some("fns-2018-05-18.m4a"));
        assert_eq!(show_identifier("http://example.com/only.ts"), None);
        assert_eq!(segment_file_name("not a url"), None);
    }

    #[test]
    fn test_file_name_falls_back_to_index() {
        let segment = Segment::new(7, "http://example.com/");
        assert_eq!(segment.file_name(), "segment_7.ts");
    }

    #[test]
    fn test_apply_outcome() {
        let mut segment = Segment::new(1, URL);
        segment.apply(FetchOutcome::Success(PathBuf::from("/tmp/a.ts")));
        assert!(segment.present);
        assert_eq!(segment.local_path(), Some(Path::new("/tmp/a.ts")));

        segment.apply(FetchOutcome::NotFound);
        assert!(!segment.present);
        assert_eq!(segment.local_path(), None);
    }

    #[test]
    fn test_from_urls_is_one_based() {
        let urls = vec!["http://a/1.ts".to_string(), "http://a/2.ts".to_string()];
        let segments = Segment::from_urls(&urls);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[1].index, 2);
        assert_eq!(segments[1].url, "http://a/2.ts");
    }
}
