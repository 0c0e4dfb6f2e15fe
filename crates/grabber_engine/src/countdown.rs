use std::io::{self, Write};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Receives the between-cycle countdown, one call per remaining second.
pub trait CountdownSink: Send + Sync {
    fn tick(&self, remaining: u64, total: u64);

    /// Called once the countdown reached zero.
    fn finished(&self) {}
}

/// Two-line countdown that redraws itself in place.
#[derive(Debug, Default)]
pub struct TerminalCountdown;

const CURSOR_UP: &str = "\x1b[F";
const CLEAR_LINE: &str = "\x1b[2K";

impl CountdownSink for TerminalCountdown {
    fn tick(&self, remaining: u64, total: u64) {
        let mut out = io::stdout().lock();
        if remaining != total {
            let _ = write!(out, "{CURSOR_UP}{CURSOR_UP}");
        }
        let _ = writeln!(out, "{CLEAR_LINE}Press Ctrl+C to close thread-grabber");
        let _ = writeln!(out, "{CLEAR_LINE}Checking for new files in {remaining} seconds....");
        let _ = out.flush();
    }

    fn finished(&self) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{CURSOR_UP}{CLEAR_LINE}{CURSOR_UP}{CLEAR_LINE}");
        let _ = out.flush();
    }
}

/// Count from `seconds` down to 0, one `tick` apart. Returns `false` if
/// cancelled before reaching zero.
pub(crate) async fn run_countdown(
    seconds: u64,
    tick: Duration,
    sink: &dyn CountdownSink,
    cancel: &CancellationToken,
) -> bool {
    for remaining in (0..=seconds).rev() {
        if cancel.is_cancelled() {
            return false;
        }
        sink.tick(remaining, seconds);
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(tick) => {}
        }
    }
    sink.finished();
    true
}
