// Platform stream extraction
//
// - youtube: URL rules for the supported platform
// - ytdlp: yt-dlp backed implementation of metadata and stream resolution

pub mod youtube;
pub mod ytdlp;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

pub use ytdlp::YtDlpExtractor;

use crate::config::ExtractorConfig;
use crate::error::Result;

/// Quality policy for one stream. Only the highest qualities are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Highest-quality video-only stream
    HighestVideo,
    /// Highest-quality audio-only stream
    HighestAudio,
}

impl Quality {
    /// yt-dlp format selector for this quality
    pub fn format_selector(&self) -> &'static str {
        match self {
            Quality::HighestVideo => "bestvideo",
            Quality::HighestAudio => "bestaudio",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::HighestVideo => write!(f, "highestvideo"),
            Quality::HighestAudio => write!(f, "highestaudio"),
        }
    }
}

/// Metadata for one video, as reported by the extractor
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Handle to one remote stream. The locator is opened by the muxer as an
/// independent input.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaStream {
    pub quality: Quality,
    pub locator: String,
}

impl MediaStream {
    pub fn new<S: Into<String>>(quality: Quality, locator: S) -> Self {
        Self {
            quality,
            locator: locator.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamExtractor: Send + Sync {
    /// Whether the URL points at a video on the supported platform
    fn validate_url(&self, url: &str) -> bool {
        youtube::validate_url(url)
    }

    /// Fetch metadata for the video
    async fn get_info(&self, url: &str) -> Result<VideoMetadata>;

    /// Resolve a stream of the requested quality
    async fn open_stream(&self, url: &str, quality: Quality) -> Result<MediaStream>;

    /// Check that the extractor can be executed, returning its version
    async fn check_availability(&self) -> Result<String>;
}

/// Factory for creating extractor instances
pub struct StreamExtractorFactory;

impl StreamExtractorFactory {
    /// Create the default extractor implementation (yt-dlp based)
    pub fn create_extractor(config: ExtractorConfig) -> Box<dyn StreamExtractor> {
        Box::new(YtDlpExtractor::new(config))
    }
}
