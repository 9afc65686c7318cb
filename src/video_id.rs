use std::sync::LazyLock;

use regex::Regex;

use crate::error::FetchError;

// `watch?v=<id>` or `youtu.be/<id>`; whichever starts first in the URL wins.
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:v=|youtu\.be/)([^&?#/\s]+)").expect("valid video id regex"));

/// Pull the video identifier out of a watch URL or a short `youtu.be` link.
pub fn extract_video_id(url: &str) -> Result<String, FetchError> {
    VIDEO_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn watch_url_with_extra_params() {
        let id = extract_video_id("https://www.youtube.com/watch?v=yv441E-i4_w&t=42s").unwrap();
        assert_eq!(id, "yv441E-i4_w");

        let id = extract_video_id("https://www.youtube.com/watch?feature=share&v=abc_123").unwrap();
        assert_eq!(id, "abc_123");
    }

    #[test]
    fn short_url() {
        let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=tracking").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");

        let id = extract_video_id("youtu.be/xyz&foo").unwrap();
        assert_eq!(id, "xyz");
    }

    #[test]
    fn fragment_is_not_part_of_id() {
        let id = extract_video_id("https://m.youtube.com/watch?v=abc#comments").unwrap();
        assert_eq!(id, "abc");
    }

    #[test]
    fn rejects_urls_without_id() {
        for url in [
            "https://example.com/video",
            "https://www.youtube.com/watch?v=",
            "",
        ] {
            let err = extract_video_id(url).unwrap_err();
            assert!(matches!(err, FetchError::InvalidUrl { .. }), "{url}");
        }
    }
}
