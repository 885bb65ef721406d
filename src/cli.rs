use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP download service
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Interface to bind to
        #[arg(long)]
        host: Option<String>,

        /// Directory downloaded files are written to
        #[arg(short, long)]
        download_dir: Option<PathBuf>,
    },

    /// Download a single video in the foreground
    Download {
        /// YouTube URL
        url: String,

        /// Directory the file is written to
        #[arg(short, long)]
        download_dir: Option<PathBuf>,
    },

    /// Check that yt-dlp and ffmpeg are available
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Output configuration file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
