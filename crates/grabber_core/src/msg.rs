use crate::DownloadOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the first cycle.
    Start,
    /// The thread page was retrieved.
    PageFetched { body: String },
    /// The thread page could not be retrieved; the cycle continues with no links.
    PageFetchFailed { reason: String },
    /// One dispatched download worker returned.
    DownloadFinished(DownloadOutcome),
    /// The between-cycle countdown reached zero.
    CountdownElapsed,
    NoOp,
}
