//! YouTube URL rules
//!
//! A URL is accepted when a video id can be recovered from it: either the
//! `v` query parameter on a known YouTube host, or the path segment of a
//! short/embed style link.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{Result, TubemuxError};

const VALID_QUERY_DOMAINS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
];

static VALID_PATH_DOMAINS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(youtu\.be/|(www\.)?youtube\.com/(embed|v|shorts|live)/)")
        .expect("valid path domain pattern")
});

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid video id pattern"));

const ID_LENGTH: usize = 11;

pub fn validate_url(url: &str) -> bool {
    video_id(url).is_ok()
}

/// Extract the 11-character video id from a YouTube URL
pub fn video_id(url: &str) -> Result<String> {
    let link = url.trim();
    let parsed = Url::parse(link)
        .map_err(|e| TubemuxError::Validation(format!("Invalid URL '{}': {}", link, e)))?;

    let mut id = parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned());

    let host = parsed.host_str().unwrap_or("");
    let id_missing = id.as_deref().is_none_or(str::is_empty);

    if VALID_PATH_DOMAINS.is_match(link) && id_missing {
        // youtu.be/<id> or youtube.com/<kind>/<id>
        let segment = if host == "youtu.be" { 1 } else { 2 };
        id = parsed.path().split('/').nth(segment).map(str::to_string);
    } else if !host.is_empty() && !VALID_QUERY_DOMAINS.contains(&host) {
        return Err(TubemuxError::Validation(format!("Not a YouTube domain: {}", host)));
    }

    let id = match id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(TubemuxError::Validation(format!("No video id found: \"{}\"", link))),
    };

    let id: String = id.chars().take(ID_LENGTH).collect();
    if !VIDEO_ID.is_match(&id) {
        return Err(TubemuxError::Validation(format!(
            "Video id ({}) does not match expected format",
            id
        )));
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "http://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://music.youtube.com/watch?v=dQw4w9WgXcQ&list=RDAMVM",
            "  https://www.youtube.com/watch?v=dQw4w9WgXcQ  ",
        ] {
            assert_eq!(video_id(url).unwrap(), "dQw4w9WgXcQ", "{}", url);
        }
    }

    #[test]
    fn test_path_urls() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abcdef",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=share",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
        ] {
            assert_eq!(video_id(url).unwrap(), "dQw4w9WgXcQ", "{}", url);
        }
    }

    #[test]
    fn test_long_id_is_truncated() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQextra").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_rejected_urls() {
        for url in [
            "not-a-url",
            "",
            "https://example.com",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?v=dQw4w9Wg!cQ",
            "https://youtu.be/",
            "https://youtu.be/x?v=dQw4w9WgXcQ",
            "https://vimeo.com/123456789",
        ] {
            assert!(!validate_url(url), "{}", url);
        }
    }

    #[test]
    fn test_rejection_is_validation_error() {
        let err = video_id("https://example.com").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.details(), "Not a YouTube domain: example.com");
    }
}
