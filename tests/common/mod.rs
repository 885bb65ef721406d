#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use tubemux::config::MediaConfig;
use tubemux::downloader::Downloader;
use tubemux::error::{Result, TubemuxError};
use tubemux::extractor::{MediaStream, Quality, StreamExtractor, VideoMetadata};
use tubemux::media::{MediaProcessorImpl, MediaProcessorTrait, MuxJob};
use tubemux::progress::ProgressSender;

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Extractor answering from fixed metadata, without touching the network
pub struct FakeExtractor {
    pub title: String,
}

impl FakeExtractor {
    pub fn titled(title: &str) -> Arc<Self> {
        Arc::new(Self {
            title: title.to_string(),
        })
    }
}

#[async_trait]
impl StreamExtractor for FakeExtractor {
    async fn get_info(&self, url: &str) -> Result<VideoMetadata> {
        let id = tubemux::extractor::youtube::video_id(url)?;
        Ok(VideoMetadata {
            id,
            title: self.title.clone(),
            uploader: None,
            duration: None,
        })
    }

    async fn open_stream(&self, _url: &str, quality: Quality) -> Result<MediaStream> {
        Ok(MediaStream::new(quality, format!("https://media.example/{}", quality)))
    }

    async fn check_availability(&self) -> Result<String> {
        Ok("2024.08.06".to_string())
    }
}

/// Muxer that fails without running anything
pub struct FailingMedia {
    pub message: String,
}

#[async_trait]
impl MediaProcessorTrait for FailingMedia {
    async fn mux(&self, _job: MuxJob, _progress: Option<ProgressSender>) -> Result<()> {
        Err(TubemuxError::Transcode(self.message.clone()))
    }

    async fn check_availability(&self) -> Result<String> {
        Ok("ffmpeg version test".to_string())
    }
}

/// Shell script standing in for ffmpeg: reports progress, touches the output
#[cfg(unix)]
pub const FFMPEG_OK: &str = r#"
for last; do :; done
printf 'frame=30\nout_time=00:00:01.000000\nprogress=continue\n'
sleep 0.2
printf 'frame=60\nout_time=00:00:02.000000\nprogress=end\n'
printf 'muxed' > "$last"
exit 0
"#;

/// Shell script standing in for ffmpeg: fails like a dropped input stream
#[cfg(unix)]
pub const FFMPEG_FAIL: &str = r#"
echo "[https @ 0x55d0] Connection reset by peer" >&2
echo "Error opening input: Connection reset by peer" >&2
exit 1
"#;

#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().to_string()
}

#[cfg(unix)]
pub fn script_media(dir: &Path, body: &str) -> Arc<MediaProcessorImpl> {
    let binary_path = write_script(dir, "ffmpeg", body);
    Arc::new(MediaProcessorImpl::new(MediaConfig {
        binary_path,
        extra_output_options: Vec::new(),
    }))
}

pub fn downloader(
    download_dir: &Path,
    extractor: Arc<dyn StreamExtractor>,
    media: Arc<dyn MediaProcessorTrait>,
) -> Downloader {
    Downloader::with_components(download_dir.to_path_buf(), extractor, media)
}
