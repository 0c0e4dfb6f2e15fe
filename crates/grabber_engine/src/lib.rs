//! Grabber engine: HTTP, disk and the concurrent cycle runner.
mod countdown;
mod download;
mod engine;
mod fetch;
mod persist;
mod types;

pub use countdown::{CountdownSink, TerminalCountdown};
pub use engine::{CycleRunner, RunnerSettings};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, RetryPolicy};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use tokio_util::sync::CancellationToken;
pub use types::{FailureKind, FetchError};
