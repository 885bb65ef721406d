use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::downloader::Downloader;
use crate::error::{Result, TubemuxError};

/// Startup steps that run once before any request is served.
pub struct SetupManager {
    download_dir: PathBuf,
}

impl SetupManager {
    pub fn new(config: &Config) -> Self {
        Self {
            download_dir: config.downloads.directory.clone(),
        }
    }

    /// Create the download directory if missing and return its absolute path.
    ///
    /// Idempotent; safe to call on every start.
    pub fn ensure_download_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.download_dir)?;
        let absolute = fs::canonicalize(&self.download_dir)?;
        info!("Download directory: {}", absolute.display());
        Ok(absolute)
    }

    /// Verify that yt-dlp and ffmpeg can be executed, so a missing tool is
    /// reported at startup rather than on the first request.
    pub async fn verify_dependencies(&self, downloader: &Downloader) -> Result<()> {
        let (extractor_version, media_version) = downloader
            .check_capabilities()
            .await
            .map_err(|e| match e {
                TubemuxError::DependencyMissing(msg) => TubemuxError::DependencyMissing(format!(
                    "{}. Install it and make sure it is on PATH, or set its binary_path in the config file",
                    msg
                )),
                other => other,
            })?;

        info!("Using yt-dlp {}", extractor_version);
        info!("Using {}", media_version);
        Ok(())
    }
}
