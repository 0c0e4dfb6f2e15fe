use crate::{AssetLink, CycleReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage { url: String },
    /// Start one concurrent worker per link; each answers with `Msg::DownloadFinished`.
    DispatchDownloads { links: Vec<AssetLink> },
    ReportCycle(CycleReport),
    StartCountdown { seconds: u64 },
    Finish,
}
