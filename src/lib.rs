//! tubemux - YouTube download and mux service
//!
//! Accepts a YouTube URL over HTTP, resolves the highest-quality video and
//! audio streams with yt-dlp, muxes them into an MP4 with ffmpeg and answers
//! with the path of the finished file.

pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod media;
pub mod progress;
pub mod server;
pub mod setup;
