// crates/reelscroll-core/src/manifest.rs
//
// The video manifest: an ordered JSON array of `{ "title", "url" }` objects.
// Array order is on-screen order and the index used by scroll lookup.

use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// Manifest file name used when nothing else is configured.
pub const DEFAULT_MANIFEST: &str = "videos.json";

/// One entry of the manifest. Extra fields in the JSON are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    pub title: String,
    pub url:   String,
}

/// Where the manifest is read from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ManifestSource {
    Url(String),
    Path(PathBuf),
}

impl ManifestSource {
    /// `http://` and `https://` locations are remote, everything else is a
    /// filesystem path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ManifestSource::Url(raw.to_string())
        } else {
            ManifestSource::Path(PathBuf::from(raw))
        }
    }
}

impl Default for ManifestSource {
    fn default() -> Self {
        ManifestSource::Path(PathBuf::from(DEFAULT_MANIFEST))
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSource::Url(u)  => f.write_str(u),
            ManifestSource::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

#[derive(Debug)]
pub enum ManifestError {
    /// Body was not a JSON array of descriptors.
    Parse(serde_json::Error),
    /// Valid JSON, but no videos in it.
    Empty,
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Parse(_) => f.write_str("invalid manifest"),
            ManifestError::Empty    => f.write_str("No videos found in the manifest"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Parse(e) => Some(e),
            ManifestError::Empty    => None,
        }
    }
}

/// Parse a manifest body. An empty array is an error, not an empty feed.
pub fn parse_manifest(body: &str) -> Result<Vec<VideoDescriptor>, ManifestError> {
    let videos: Vec<VideoDescriptor> =
        serde_json::from_str(body).map_err(ManifestError::Parse)?;
    if videos.is_empty() {
        return Err(ManifestError::Empty);
    }
    Ok(videos)
}

/// Resolve a descriptor `url` relative to where the manifest came from.
///
/// Remote manifests join every entry onto their base URL, which also covers
/// root-relative (`/a.mp4`) and scheme-relative (`//host/a.mp4`) entries.
/// Local manifests pass absolute URLs and paths through and join the rest
/// onto the manifest's directory.
pub fn resolve_media_url(source: &ManifestSource, url: &str) -> String {
    match source {
        ManifestSource::Path(_) if url.contains("://") || Path::new(url).is_absolute() => {
            url.to_string()
        }
        ManifestSource::Path(p) => {
            let dir = p.parent().unwrap_or_else(|| Path::new(""));
            dir.join(url).to_string_lossy().into_owned()
        }
        ManifestSource::Url(base) => url::Url::parse(base)
            .and_then(|b| b.join(url))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptors_in_order() {
        let body = r#"[
            {"title": "First",  "url": "a.mp4"},
            {"title": "Second", "url": "b.mp4", "likes": 12}
        ]"#;
        let videos = parse_manifest(body).unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].title, "First");
        assert_eq!(videos[1].url, "b.mp4");
    }

    #[test]
    fn empty_array_is_an_error() {
        assert!(matches!(parse_manifest("[]"), Err(ManifestError::Empty)));
        assert_eq!(ManifestError::Empty.to_string(), "No videos found in the manifest");
    }

    #[test]
    fn missing_fields_are_a_parse_error() {
        let err = parse_manifest(r#"[{"title": "no url"}]"#).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn source_parse_distinguishes_urls_and_paths() {
        assert_eq!(
            ManifestSource::parse("https://cdn.example.com/videos.json"),
            ManifestSource::Url("https://cdn.example.com/videos.json".into()),
        );
        assert_eq!(
            ManifestSource::parse(" feeds/videos.json "),
            ManifestSource::Path(PathBuf::from("feeds/videos.json")),
        );
    }

    #[test]
    fn relative_urls_resolve_against_manifest_location() {
        let local = ManifestSource::Path(PathBuf::from("feeds/videos.json"));
        assert_eq!(
            resolve_media_url(&local, "clip.mp4"),
            Path::new("feeds").join("clip.mp4").to_string_lossy(),
        );

        let remote = ManifestSource::Url("https://cdn.example.com/feed/videos.json".into());
        assert_eq!(
            resolve_media_url(&remote, "clips/one.mp4"),
            "https://cdn.example.com/feed/clips/one.mp4",
        );
    }

    #[test]
    fn root_and_scheme_relative_urls_join_remote_base() {
        let remote = ManifestSource::Url("https://cdn.example.com/feed/videos.json".into());
        assert_eq!(
            resolve_media_url(&remote, "/media/a.mp4"),
            "https://cdn.example.com/media/a.mp4",
        );
        assert_eq!(
            resolve_media_url(&remote, "//other.example.com/b.mp4"),
            "https://other.example.com/b.mp4",
        );
        assert_eq!(
            resolve_media_url(&remote, "http://media.example.com/x.mp4"),
            "http://media.example.com/x.mp4",
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let local = ManifestSource::default();
        assert_eq!(
            resolve_media_url(&local, "https://media.example.com/x.mp4"),
            "https://media.example.com/x.mp4",
        );
    }
}
