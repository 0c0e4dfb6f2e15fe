use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::{DownloadOutcome, DownloadStatus};

const SIZE_SUFFIXES: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Binary-unit size with two decimals, e.g. `1.50 KB`.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_SUFFIXES.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", SIZE_SUFFIXES[unit])
}

/// Run-wide counters, shared between the cycle runner and the interrupt handler.
#[derive(Debug)]
pub struct RunStats {
    started: Instant,
    files_downloaded: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            files_downloaded: AtomicU64::new(0),
        }
    }

    /// Counts `outcome` if it wrote a file.
    pub fn record(&self, outcome: &DownloadOutcome) {
        if outcome.is_downloaded() {
            self.files_downloaded.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn files_downloaded(&self) -> u64 {
        self.files_downloaded.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn summary(&self, thread_id: &str) -> RunSummary {
        RunSummary {
            files_downloaded: self.files_downloaded(),
            elapsed: self.elapsed(),
            thread_id: thread_id.to_string(),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_downloaded: u64,
    pub elapsed: Duration,
    pub thread_id: String,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✓ DOWNLOAD COMPLETE, {} FILES IN {:.2?} for thread: {}",
            self.files_downloaded, self.elapsed, self.thread_id
        )
    }
}

/// Tally of a single fetch-extract-download pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub cycle: u64,
    pub links_found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub page_error: Option<String>,
}

impl CycleReport {
    pub(crate) fn tally(&mut self, outcome: &DownloadOutcome) {
        match outcome.status {
            DownloadStatus::Downloaded => self.downloaded += 1,
            DownloadStatus::SkippedExisting | DownloadStatus::SkippedUnsupportedSite => {
                self.skipped += 1
            }
            DownloadStatus::Failed(_) => self.failed += 1,
        }
    }

    /// Outcomes received so far.
    pub fn completed(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}
