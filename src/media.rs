//! YouTube link helpers.

use std::sync::OnceLock;

use regex::Regex;

/// Thumbnail sizes published by YouTube.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThumbnailQuality {
    /// 1280x720, not generated for every video
    MaxRes,
    /// 480x360
    #[default]
    High,
    /// 320x180
    Medium,
    /// 640x480
    Standard,
}

impl ThumbnailQuality {
    fn file_name(&self) -> &'static str {
        match self {
            ThumbnailQuality::MaxRes => "maxresdefault",
            ThumbnailQuality::High => "hqdefault",
            ThumbnailQuality::Medium => "mqdefault",
            ThumbnailQuality::Standard => "sddefault",
        }
    }
}

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([^&\s?/]+)",
        )
        .unwrap()
    })
}

fn bare_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap())
}

/// Extract the video ID from a watch, short, embed or `/v/` link, or accept
/// a bare 11-character ID.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if let Some(caps) = url_pattern().captures(url) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    if bare_id_pattern().is_match(url) {
        return Some(url.to_string());
    }
    None
}

/// Thumbnail URL for a video link or ID.
pub fn thumbnail_url(video: &str, quality: ThumbnailQuality) -> Option<String> {
    let id = extract_video_id(video)?;
    if id.len() != 11 {
        return None;
    }
    Some(format!(
        "https://img.youtube.com/vi/{}/{}.jpg",
        id,
        quality.file_name()
    ))
}

/// Default (high quality) thumbnail; maxres is not always available.
pub fn youtube_thumbnail(video: &str) -> Option<String> {
    thumbnail_url(video, ThumbnailQuality::High)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_extract_from_short_embed_and_v_urls() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{}", url);
        }
    }

    #[test]
    fn test_extract_bare_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(extract_video_id("tooshort"), None);
    }

    #[test]
    fn test_extract_rejects_other_urls() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_thumbnail_qualities() {
        assert_eq!(
            thumbnail_url("dQw4w9WgXcQ", ThumbnailQuality::MaxRes).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg")
        );
        assert_eq!(
            thumbnail_url("https://youtu.be/dQw4w9WgXcQ", ThumbnailQuality::Medium).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg")
        );
        assert_eq!(
            youtube_thumbnail("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
    }

    #[test]
    fn test_thumbnail_requires_full_length_id() {
        assert_eq!(youtube_thumbnail("https://youtu.be/abc"), None);
    }
}
