use async_trait::async_trait;
use std::process::ExitStatus;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, debug};

use crate::config::MediaConfig;
use crate::error::{Result, TubemuxError};
use crate::progress::{ProgressParser, ProgressSender};
use super::{MediaProcessorTrait, MuxJob, MediaCommandBuilder};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn mux(&self, job: MuxJob, progress: Option<ProgressSender>) -> Result<()> {
        info!("Muxing {} + {} -> {}",
              job.video.quality, job.audio.quality, job.output_path.display());

        let command = self.command_builder.mux_streams(
            &job.video.locator,
            &job.audio.locator,
            &job.output_path,
            &self.config.extra_output_options,
        );

        debug!("{}: {} {:?}", command.description, command.binary_path, command.args);

        let mut child = command.to_command().spawn()
            .map_err(|e| TubemuxError::Transcode(format!("Failed to execute ffmpeg: {}", e)))?;

        let stdout = child.stdout.take()
            .ok_or_else(|| TubemuxError::Transcode("Failed to capture ffmpeg stdout".to_string()))?;
        let stderr = child.stderr.take()
            .ok_or_else(|| TubemuxError::Transcode("Failed to capture ffmpeg stderr".to_string()))?;

        // Drained concurrently so a chatty stderr cannot stall the progress pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let mut segments = BufReader::new(stderr).split(b'\n');
            while let Ok(Some(segment)) = segments.next_segment().await {
                let line = lossy_line(&segment);
                debug!("[ffmpeg] {}", line);
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        let mut parser = ProgressParser::new();
        let mut segments = BufReader::new(stdout).split(b'\n');
        while let Some(segment) = segments.next_segment().await? {
            if let Some(event) = parser.feed_line(&lossy_line(&segment)) {
                if let Some(tx) = &progress {
                    tx.send(event);
                }
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(TubemuxError::Transcode(exit_message(status, &stderr)));
        }

        info!("Muxing completed: {}", job.output_path.display());
        Ok(())
    }

    async fn check_availability(&self) -> Result<String> {
        let output = self.command_builder.version_check()
            .to_command()
            .output()
            .await
            .map_err(|e| TubemuxError::DependencyMissing(
                format!("ffmpeg not found at '{}': {}", self.config.binary_path, e)))?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            info!("Media processor is available: {}", first_line);
            Ok(first_line.to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TubemuxError::DependencyMissing(format!("ffmpeg version check failed: {}", stderr.trim())))
        }
    }
}

fn exit_message(status: ExitStatus, stderr: &str) -> String {
    if let Some(code) = status.code() {
        return format!("ffmpeg exited with code {}: {}", code, extract_error(stderr));
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("ffmpeg was killed with signal {}", signal);
        }
    }

    format!("ffmpeg terminated abnormally: {}", extract_error(stderr))
}

/// ffmpeg echoes input metadata verbatim, which is not always UTF-8.
fn lossy_line(segment: &[u8]) -> String {
    let segment = segment.strip_suffix(b"\r").unwrap_or(segment);
    String::from_utf8_lossy(segment).into_owned()
}

/// ffmpeg's diagnostics end with a block of unindented, unprefixed lines
/// after the last `[component @ 0x...]` or indented stream-info line.
pub fn extract_error(stderr: &str) -> String {
    stderr
        .lines()
        .fold(Vec::new(), |mut messages, line| {
            if line.starts_with(' ') || line.starts_with('[') {
                messages.clear();
            } else if !line.is_empty() {
                messages.push(line);
            }
            messages
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{MediaStream, Quality};
    use crate::progress;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_extract_error_keeps_trailing_block() {
        let stderr = "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'pipe:0':\n  Duration: N/A\n[https @ 0x5581] HTTP error 403 Forbidden\nError opening input: Server returned 403 Forbidden (access denied)\nError opening input file https://rr1.example/videoplayback.\n";
        assert_eq!(
            extract_error(stderr),
            "Error opening input: Server returned 403 Forbidden (access denied)\nError opening input file https://rr1.example/videoplayback."
        );
    }

    #[test]
    fn test_extract_error_empty() {
        assert_eq!(extract_error(""), "");
        assert_eq!(extract_error("[aac @ 0x1] Qavg: 1.0\n"), "");
    }

    fn job(output_path: PathBuf) -> MuxJob {
        MuxJob {
            video: MediaStream::new(Quality::HighestVideo, "https://video.example/v"),
            audio: MediaStream::new(Quality::HighestAudio, "https://audio.example/a"),
            output_path,
        }
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mux_success_forwards_progress() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ffmpeg", r#"
for last; do :; done
printf 'frame=24\nout_time=00:00:01.000000\nprogress=continue\n'
printf 'frame=48\nout_time=00:00:02.000000\nprogress=end\n'
: > "$last"
exit 0
"#);
        let processor = MediaProcessorImpl::new(MediaConfig {
            binary_path: script,
            extra_output_options: Vec::new(),
        });

        let output = dir.path().join("Some Title.mp4");
        let (tx, mut events) = progress::channel();
        processor.mux(job(output.clone()), Some(tx)).await.unwrap();

        assert!(output.exists());
        assert_eq!(events.next().await.unwrap().timemark, "00:00:01.00");
        let last = events.next().await.unwrap();
        assert_eq!(last.frames, Some(48));
        assert!(events.next().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mux_failure_reports_ffmpeg_message() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ffmpeg", r#"
echo "  Duration: N/A, start: 0.000000, bitrate: N/A" >&2
echo "[https @ 0x5581] Connection reset by peer" >&2
echo "Error opening input: Connection reset by peer" >&2
exit 1
"#);
        let processor = MediaProcessorImpl::new(MediaConfig {
            binary_path: script,
            extra_output_options: Vec::new(),
        });

        let err = processor.mux(job(dir.path().join("out.mp4")), None).await.unwrap_err();
        assert!(matches!(err, TubemuxError::Transcode(_)));
        assert_eq!(err.details(), "ffmpeg exited with code 1: Error opening input: Connection reset by peer");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mux_failure_survives_non_utf8_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ffmpeg", r#"
echo "Input #0, mov, from pipe:" >&2
printf '    title           : Caf\351\n' >&2
echo "[https @ 0x5581] Connection reset by peer" >&2
echo "Error opening input: Connection reset by peer" >&2
exit 1
"#);
        let processor = MediaProcessorImpl::new(MediaConfig {
            binary_path: script,
            extra_output_options: Vec::new(),
        });

        let err = processor.mux(job(dir.path().join("out.mp4")), None).await.unwrap_err();
        assert_eq!(err.details(), "ffmpeg exited with code 1: Error opening input: Connection reset by peer");
    }

    #[test]
    fn test_lossy_line() {
        assert_eq!(lossy_line(b"frame=24\r"), "frame=24");
        assert_eq!(lossy_line(b"title : Caf\xe9"), "title : Caf\u{fffd}");
    }

    #[tokio::test]
    async fn test_mux_missing_binary() {
        let processor = MediaProcessorImpl::new(MediaConfig {
            binary_path: "/nonexistent/ffmpeg".to_string(),
            extra_output_options: Vec::new(),
        });

        let err = processor.mux(job(PathBuf::from("/tmp/never.mp4")), None).await.unwrap_err();
        assert!(err.details().starts_with("Failed to execute ffmpeg"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_check_availability() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "ffmpeg",
            "echo 'ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers'\necho 'built with gcc'\n");
        let processor = MediaProcessorImpl::new(MediaConfig {
            binary_path: script,
            extra_output_options: Vec::new(),
        });

        let version = processor.check_availability().await.unwrap();
        assert_eq!(version, "ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers");

        let missing = MediaProcessorImpl::new(MediaConfig {
            binary_path: "/nonexistent/ffmpeg".to_string(),
            extra_output_options: Vec::new(),
        });
        assert!(matches!(missing.check_availability().await, Err(TubemuxError::DependencyMissing(_))));
    }
}
