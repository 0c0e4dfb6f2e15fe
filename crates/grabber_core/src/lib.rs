//! Grabber core: site profiles, link extraction and the pure cycle state machine.
mod effect;
mod error;
mod extract;
mod filename;
mod msg;
mod outcome;
mod report;
mod site;
mod state;
mod target;
mod update;

pub use effect::Effect;
pub use error::CoreError;
pub use extract::{extract_links, AssetLink};
pub use filename::{
    extension_of, fallback_position, last_path_segment, numeric_file_name, sanitize_file_name,
    swap_extension, DEFAULT_EXTENSION, FALLBACK_EXTENSIONS,
};
pub use msg::Msg;
pub use outcome::{DownloadOutcome, DownloadStatus, FailureReason};
pub use report::{format_bytes, CycleReport, RunStats, RunSummary};
pub use site::SiteProfile;
pub use state::{CycleState, Phase, RunMode};
pub use target::ThreadTarget;
pub use update::update;
