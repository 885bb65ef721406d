use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, TubemuxError};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

fn default_ytdlp_binary() -> String {
    "yt-dlp".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub downloads: DownloadsConfig,
    pub media: MediaConfig,
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind the HTTP listener to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadsConfig {
    /// Directory muxed files are written to; created at startup if missing
    #[serde(default = "default_download_dir")]
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    #[serde(default = "default_ffmpeg_binary")]
    pub binary_path: String,
    /// Additional output options inserted before the output path
    /// e.g. ["-metadata", "comment=tubemux"]
    #[serde(default)]
    pub extra_output_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Path to yt-dlp binary
    #[serde(default = "default_ytdlp_binary")]
    pub binary_path: String,
    /// Additional arguments passed to every yt-dlp invocation
    /// e.g. ["--proxy", "socks5://127.0.0.1:1080"]
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            directory: default_download_dir(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: default_ffmpeg_binary(),
            extra_output_options: Vec::new(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary_path: default_ytdlp_binary(),
            extra_args: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TubemuxError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TubemuxError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TubemuxError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Address string the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
