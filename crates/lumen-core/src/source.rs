//! Media source description supplied by the host
//!
//! The media URL is opaque to the player apart from extension-based MIME
//! inference. Relative URLs are resolved against the page origin.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Everything the host hands the player for one title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Playable media URL
    pub url: Url,
    /// Optional subtitle track URL
    pub subtitle_url: Option<Url>,
    /// Display title
    pub title: Option<String>,
    /// Logo shown on the loading overlay
    pub logo_url: Option<Url>,
    /// Quality label, display only
    pub quality: Option<String>,
}

impl MediaSource {
    /// Create a source from an absolute URL
    pub fn new(url: Url) -> Self {
        Self {
            url,
            subtitle_url: None,
            title: None,
            logo_url: None,
            quality: None,
        }
    }

    /// Resolve a raw (possibly relative) media URL against the page origin
    pub fn resolve(raw: &str, page_origin: &Url) -> Result<Self> {
        Ok(Self::new(resolve_url(raw, page_origin)?))
    }

    pub fn with_subtitles(mut self, raw: &str, page_origin: &Url) -> Result<Self> {
        self.subtitle_url = Some(resolve_url(raw, page_origin)?);
        Ok(self)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_logo(mut self, raw: &str, page_origin: &Url) -> Result<Self> {
        self.logo_url = Some(resolve_url(raw, page_origin)?);
        Ok(self)
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    /// Lowercased file extension of the media URL
    pub fn extension(&self) -> Option<String> {
        source_extension(self.url.as_str())
    }

    /// MIME type inferred from the media URL
    pub fn mime_type(&self) -> &'static str {
        infer_mime_type(self.url.as_str())
    }

    /// True when both sources bind the same engine configuration.
    ///
    /// Title, logo and quality are display-only and never force a new session.
    pub fn same_binding(&self, other: &MediaSource) -> bool {
        self.url == other.url && self.subtitle_url == other.subtitle_url
    }
}

/// Resolve an absolute or origin-relative URL
pub fn resolve_url(raw: &str, page_origin: &Url) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::InvalidSource("empty URL".to_string()));
    }

    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(page_origin.join(raw)?),
        Err(e) => Err(e.into()),
    }
}

/// Lowercased extension of the last path segment, ignoring query and fragment
pub fn source_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Extension-based MIME type inference, defaulting to `video/mp4`
pub fn infer_mime_type(url: &str) -> &'static str {
    match source_extension(url).as_deref() {
        Some("mkv") => "video/x-matroska",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg") | Some("ogv") => "video/ogg",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("flv") => "video/x-flv",
        Some("wmv") => "video/x-ms-wmv",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://watch.example.com/player/").unwrap()
    }

    #[test]
    fn test_mime_inference() {
        assert_eq!(infer_mime_type("https://a.b/film.mkv"), "video/x-matroska");
        assert_eq!(infer_mime_type("https://a.b/film.webm"), "video/webm");
        assert_eq!(infer_mime_type("https://a.b/film.OGV"), "video/ogg");
        assert_eq!(infer_mime_type("https://a.b/film.mov?token=abc"), "video/quicktime");
        assert_eq!(infer_mime_type("https://a.b/film.wmv#t=10"), "video/x-ms-wmv");
        assert_eq!(infer_mime_type("https://a.b/stream"), "video/mp4");
        assert_eq!(infer_mime_type("https://a.b/film.xyz"), "video/mp4");
    }

    #[test]
    fn test_extension_ignores_directories() {
        assert_eq!(source_extension("https://a.b/v1.2/stream"), None);
        assert_eq!(source_extension("/media/.hidden"), None);
        assert_eq!(source_extension("clip.tar.FLV").as_deref(), Some("flv"));
    }

    #[test]
    fn test_resolve_relative_against_origin() {
        let source = MediaSource::resolve("/files/movie.mp4", &origin()).unwrap();
        assert_eq!(source.url.as_str(), "https://watch.example.com/files/movie.mp4");

        let source = MediaSource::resolve("movie.mkv", &origin()).unwrap();
        assert_eq!(source.url.as_str(), "https://watch.example.com/player/movie.mkv");
        assert_eq!(source.mime_type(), "video/x-matroska");
    }

    #[test]
    fn test_resolve_absolute_and_empty() {
        let source = MediaSource::resolve("https://cdn.example.com/a.webm", &origin()).unwrap();
        assert_eq!(source.url.host_str(), Some("cdn.example.com"));
        assert!(matches!(
            MediaSource::resolve("   ", &origin()),
            Err(Error::InvalidSource(_))
        ));
    }

    #[test]
    fn test_same_binding_ignores_display_fields() {
        let a = MediaSource::resolve("/a.mp4", &origin()).unwrap();
        let b = a.clone().with_title("Other").with_quality("1080p");
        assert!(a.same_binding(&b));

        let c = a.clone().with_subtitles("/a.vtt", &origin()).unwrap();
        assert!(!a.same_binding(&c));
    }
}
