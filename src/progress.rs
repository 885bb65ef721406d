//! Muxing progress reporting
//!
//! ffmpeg is started with `-progress pipe:1`, which prints blocks of
//! `key=value` lines terminated by a `progress=continue|end` line.
//! [`ProgressParser`] folds those lines into [`ProgressEvent`]s, and the
//! channel types carry them from the muxer to whoever wants to watch.

use tokio::sync::mpsc;

/// One progress report emitted while ffmpeg is muxing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressEvent {
    /// Frames processed so far
    pub frames: Option<u64>,
    /// Current processing rate in frames per second
    pub fps: Option<f64>,
    /// Current output bitrate in kbit/s
    pub bitrate_kbps: Option<f64>,
    /// Bytes written to the output so far
    pub total_size: Option<u64>,
    /// Elapsed output time marker, `HH:MM:SS.ss`
    pub timemark: String,
    /// Processing speed relative to realtime
    pub speed: Option<f64>,
}

/// Create a progress channel.
///
/// The channel is unbounded so the muxer never waits on a slow consumer.
pub fn channel() -> (ProgressSender, ProgressStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressStream { rx })
}

/// Producer half, handed to the muxer.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    /// Fire-and-forget: a dropped consumer is not an error.
    pub fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Consumer half. Yields events until the muxer finishes; it cannot be
/// restarted once drained.
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressStream {
    pub async fn next(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}

/// Accumulates ffmpeg `-progress` key/value lines into events.
#[derive(Debug, Default)]
pub struct ProgressParser {
    current: ProgressEvent,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line. Returns an event when a block is complete.
    pub fn feed_line(&mut self, line: &str) -> Option<ProgressEvent> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();

        match key.trim() {
            "frame" => self.current.frames = value.parse().ok(),
            "fps" => self.current.fps = value.parse().ok(),
            "bitrate" => {
                self.current.bitrate_kbps = value.trim_end_matches("kbits/s").trim().parse().ok()
            }
            "total_size" => self.current.total_size = value.parse().ok(),
            "out_time" => self.current.timemark = format_timemark(value),
            "speed" => self.current.speed = value.trim_end_matches('x').trim().parse().ok(),
            "progress" => return Some(std::mem::take(&mut self.current)),
            _ => {}
        }

        None
    }
}

/// ffmpeg prints `out_time` with microsecond precision; keep centiseconds.
fn format_timemark(raw: &str) -> String {
    match raw.split_once('.') {
        Some((whole, frac)) if frac.chars().count() > 2 => {
            format!("{}.{}", whole, frac.chars().take(2).collect::<String>())
        }
        _ => raw.to_string(),
    }
}
