//! tubemux - YouTube download and mux service
//!
//! Entry point: loads configuration, runs the startup checks and then either
//! serves the HTTP endpoint or performs a one-off download.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use tubemux::cli::{Args, Commands};
use tubemux::config::Config;
use tubemux::downloader::Downloader;
use tubemux::error::TubemuxError;
use tubemux::progress;
use tubemux::server;
use tubemux::setup::SetupManager;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let command = match args.command {
        Some(command) => command,
        None => Commands::Serve {
            port: port_from_env()?,
            host: None,
            download_dir: None,
        },
    };

    match command {
        Commands::Serve { port, host, download_dir } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(dir) = download_dir {
                config.downloads.directory = dir;
            }

            let downloader = prepare(&config).await?;
            info!("Ensure ffmpeg and yt-dlp stay available on PATH while serving");
            server::serve(&config, downloader).await?;
        }
        Commands::Download { url, download_dir } => {
            if let Some(dir) = download_dir {
                config.downloads.directory = dir;
            }

            let downloader = prepare(&config).await?;
            let path = download_with_spinner(&downloader, &url).await?;
            println!("{}", path.display());
        }
        Commands::Check => {
            let downloader = Downloader::new(&config, config.downloads.directory.clone());
            let (ytdlp_version, ffmpeg_version) = downloader.check_capabilities().await?;
            println!("yt-dlp: {}", ytdlp_version);
            println!("ffmpeg: {}", ffmpeg_version);
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Startup steps shared by every command that downloads
async fn prepare(config: &Config) -> Result<Downloader> {
    let setup = SetupManager::new(config);
    let download_dir = setup.ensure_download_dir()?;
    let downloader = Downloader::new(config, download_dir);
    setup.verify_dependencies(&downloader).await?;
    Ok(downloader)
}

/// Run one download, rendering muxing progress on the terminal
async fn download_with_spinner(downloader: &Downloader, url: &str) -> Result<PathBuf> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Resolving streams...");

    let (tx, mut events) = progress::channel();
    let spinner = pb.clone();
    let render = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            spinner.set_message(format!("Muxing {}", event.timemark));
        }
    });

    let result = downloader.download(url, Some(tx)).await;
    let _ = render.await;

    match result {
        Ok(path) => {
            pb.finish_with_message(format!("Downloaded {}", path.display()));
            Ok(path)
        }
        Err(e) => {
            pb.abandon_with_message("Download failed");
            Err(e.into())
        }
    }
}

fn port_from_env() -> Result<Option<u16>> {
    match std::env::var("PORT") {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| anyhow::Error::from(TubemuxError::Config(format!("Invalid PORT '{}': {}", value, e)))),
        Err(_) => Ok(None),
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".tubemux").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "tubemux.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("tubemux.log").display());

    Ok(())
}
