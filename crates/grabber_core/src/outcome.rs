use std::fmt;

use crate::filename::extension_of;

/// Result of one download worker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub file_name: String,
    /// Only meaningful for [`DownloadStatus::Downloaded`].
    pub bytes_written: u64,
    pub final_extension: String,
    pub status: DownloadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded,
    SkippedExisting,
    SkippedUnsupportedSite,
    Failed(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    MaxRetriesExceeded,
    NonSuccessStatus(u16),
    WriteError(String),
    WorkerPanicked,
}

impl DownloadOutcome {
    pub fn downloaded(file_name: impl Into<String>, bytes_written: u64) -> Self {
        Self::with_status(file_name, bytes_written, DownloadStatus::Downloaded)
    }

    pub fn skipped_existing(file_name: impl Into<String>) -> Self {
        Self::with_status(file_name, 0, DownloadStatus::SkippedExisting)
    }

    pub fn skipped_unsupported(file_name: impl Into<String>) -> Self {
        Self::with_status(file_name, 0, DownloadStatus::SkippedUnsupportedSite)
    }

    pub fn failed(file_name: impl Into<String>, reason: FailureReason) -> Self {
        Self::with_status(file_name, 0, DownloadStatus::Failed(reason))
    }

    fn with_status(file_name: impl Into<String>, bytes_written: u64, status: DownloadStatus) -> Self {
        let file_name = file_name.into();
        let final_extension = extension_of(&file_name).to_string();
        Self {
            file_name,
            bytes_written,
            final_extension,
            status,
        }
    }

    pub fn is_downloaded(&self) -> bool {
        self.status == DownloadStatus::Downloaded
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::MaxRetriesExceeded => write!(f, "max retries exceeded"),
            FailureReason::NonSuccessStatus(code) => write!(f, "non-200 status ({code})"),
            FailureReason::WriteError(message) => write!(f, "write error: {message}"),
            FailureReason::WorkerPanicked => write!(f, "worker panicked"),
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStatus::Downloaded => write!(f, "downloaded"),
            DownloadStatus::SkippedExisting => write!(f, "already on disk"),
            DownloadStatus::SkippedUnsupportedSite => write!(f, "unsupported link"),
            DownloadStatus::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}
