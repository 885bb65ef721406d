// Media muxing
//
// - Processor: ffmpeg-backed implementation that runs the mux and pumps events
// - Commands: command builders for ffmpeg invocations

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::PathBuf;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::extractor::MediaStream;
use crate::progress::ProgressSender;

/// One mux operation: a video-only and an audio-only input into one MP4.
#[derive(Debug, Clone, PartialEq)]
pub struct MuxJob {
    pub video: MediaStream,
    pub audio: MediaStream,
    pub output_path: PathBuf,
}

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Mux the job's streams into its output path.
    ///
    /// Resolves once the subprocess has ended; `Err` carries the
    /// subprocess error. Progress is forwarded to `progress` when given.
    async fn mux(&self, job: MuxJob, progress: Option<ProgressSender>) -> Result<()>;

    /// Check that the media processor can be executed, returning its version line
    async fn check_availability(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
