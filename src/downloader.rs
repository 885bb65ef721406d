use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, TubemuxError};
use crate::extractor::{Quality, StreamExtractor, StreamExtractorFactory, VideoMetadata};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait, MuxJob};
use crate::progress::ProgressSender;

const OUTPUT_EXTENSION: &str = "mp4";

/// Download pipeline: metadata, stream resolution, muxing.
///
/// Cheap to clone; each `download` call owns its own streams and subprocess.
#[derive(Clone)]
pub struct Downloader {
    download_dir: PathBuf,
    extractor: Arc<dyn StreamExtractor>,
    media: Arc<dyn MediaProcessorTrait>,
}

impl Downloader {
    /// Build the production pipeline (yt-dlp + ffmpeg) writing into `download_dir`.
    ///
    /// The directory is expected to exist; see `SetupManager::ensure_download_dir`.
    pub fn new(config: &Config, download_dir: PathBuf) -> Self {
        let extractor = StreamExtractorFactory::create_extractor(config.extractor.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        Self::with_components(download_dir, Arc::from(extractor), Arc::from(media))
    }

    pub fn with_components(
        download_dir: PathBuf,
        extractor: Arc<dyn StreamExtractor>,
        media: Arc<dyn MediaProcessorTrait>,
    ) -> Self {
        Self {
            download_dir,
            extractor,
            media,
        }
    }

    /// Whether the URL is acceptable for download
    pub fn is_valid_url(&self, url: &str) -> bool {
        self.extractor.validate_url(url)
    }

    /// Check both external tools, returning their version strings
    pub async fn check_capabilities(&self) -> Result<(String, String)> {
        let extractor_version = self.extractor.check_availability().await?;
        let media_version = self.media.check_availability().await?;
        Ok((extractor_version, media_version))
    }

    /// Download the video at `url` and mux it into the download directory.
    ///
    /// Resolves with the output path once ffmpeg finishes. Any failure along
    /// the way is returned as the single error; a partially written output
    /// file is left in place.
    pub async fn download(&self, url: &str, progress: Option<ProgressSender>) -> Result<PathBuf> {
        let url = url.trim();
        if !self.extractor.validate_url(url) {
            return Err(TubemuxError::Validation("Invalid YouTube URL".to_string()));
        }

        let info = self.extractor.get_info(url).await?;
        let file_stem = output_file_stem(&info);
        let output_path = self.download_dir.join(format!("{}.{}", file_stem, OUTPUT_EXTENSION));

        info!("Starting download for: {}", file_stem);

        let (video, audio) = tokio::try_join!(
            self.extractor.open_stream(url, Quality::HighestVideo),
            self.extractor.open_stream(url, Quality::HighestAudio),
        )?;

        let job = MuxJob {
            video,
            audio,
            output_path: output_path.clone(),
        };
        self.media.mux(job, progress).await?;

        info!("Download finished: {}", output_path.display());
        Ok(output_path)
    }
}

/// Keep only word characters (`[A-Za-z0-9_]`) and whitespace, then trim.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || is_title_space(*c))
        .collect::<String>()
        .trim_matches(is_title_space)
        .to_string()
}

/// Unicode whitespace plus the byte order mark, which titles sometimes carry
fn is_title_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// File name base for a video. Titles with nothing left after sanitizing
/// fall back to the video id.
fn output_file_stem(info: &VideoMetadata) -> String {
    let title = sanitize_title(&info.title);
    if !title.is_empty() {
        return title;
    }

    let id = sanitize_title(&info.id);
    if id.is_empty() {
        "untitled".to_string()
    } else {
        format!("untitled_{}", id)
    }
}
