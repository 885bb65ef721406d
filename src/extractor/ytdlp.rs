// yt-dlp backed extractor
//
// Metadata comes from `--dump-json`; streams are resolved to direct media
// URLs with `--get-url`, which ffmpeg then opens as separate inputs.

use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

use super::{MediaStream, Quality, StreamExtractor, VideoMetadata};
use crate::config::ExtractorConfig;
use crate::error::{Result, TubemuxError};

/// Extractor driving the `yt-dlp` executable
pub struct YtDlpExtractor {
    config: ExtractorConfig,
}

impl YtDlpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Arguments shared by every invocation, followed by the call-specific ones
    fn build_args(&self, specific: &[&str], url: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.extend(specific.iter().map(|s| s.to_string()));
        args.push(url.to_string());
        args
    }

    async fn run(&self, args: &[String]) -> std::io::Result<Output> {
        debug!("Executing yt-dlp: {} {:?}", self.config.binary_path, args);

        Command::new(&self.config.binary_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
    }

    /// Parse `--dump-json` output
    fn parse_metadata(stdout: &[u8]) -> Result<VideoMetadata> {
        serde_json::from_slice(stdout)
            .map_err(|e| TubemuxError::MetadataFetch(format!("Invalid yt-dlp JSON: {}", e)))
    }

    /// First non-empty line of `--get-url` output
    fn first_url(stdout: &[u8]) -> Option<String> {
        String::from_utf8_lossy(stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }
}

/// yt-dlp reports failures as `ERROR: ...` lines on stderr
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr
        .lines()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| stderr.trim().to_string());

    if message.is_empty() {
        format!("yt-dlp exited with {}", output.status)
    } else {
        message
    }
}

#[async_trait]
impl StreamExtractor for YtDlpExtractor {
    async fn get_info(&self, url: &str) -> Result<VideoMetadata> {
        let args = self.build_args(&["--dump-json", "--skip-download"], url);
        let output = self.run(&args).await
            .map_err(|e| TubemuxError::MetadataFetch(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            return Err(TubemuxError::MetadataFetch(failure_message(&output)));
        }

        let metadata = Self::parse_metadata(&output.stdout)?;
        info!("Fetched metadata for {}: {}", metadata.id, metadata.title);
        Ok(metadata)
    }

    async fn open_stream(&self, url: &str, quality: Quality) -> Result<MediaStream> {
        let args = self.build_args(&["-f", quality.format_selector(), "--get-url"], url);
        let output = self.run(&args).await
            .map_err(|e| TubemuxError::Stream(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            return Err(TubemuxError::Stream(failure_message(&output)));
        }

        let locator = Self::first_url(&output.stdout)
            .ok_or_else(|| TubemuxError::Stream(format!("No {} stream available", quality)))?;

        debug!("Resolved {} stream", quality);
        Ok(MediaStream::new(quality, locator))
    }

    async fn check_availability(&self) -> Result<String> {
        let output = self.run(&["--version".to_string()]).await
            .map_err(|e| TubemuxError::DependencyMissing(
                format!("yt-dlp not found at '{}': {}", self.config.binary_path, e)))?;

        if !output.status.success() {
            return Err(TubemuxError::DependencyMissing(
                format!("yt-dlp version check failed: {}", failure_message(&output))));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("Stream extractor is available: yt-dlp {}", version);
        Ok(version)
    }
}
