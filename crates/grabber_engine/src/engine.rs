use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use grabber_core::{
    format_bytes, update, AssetLink, CycleReport, CycleState, DownloadOutcome, DownloadStatus,
    Effect, FailureReason, Msg, RunMode, RunStats, RunSummary, ThreadTarget,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::countdown::{run_countdown, CountdownSink, TerminalCountdown};
use crate::Fetcher;

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub mode: RunMode,
    /// Download again even when the file is already on disk.
    pub force_refresh: bool,
    /// Cap on concurrent downloads within a cycle; `None` starts every link at once.
    pub max_in_flight: Option<NonZeroUsize>,
    pub countdown_tick: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            mode: RunMode::SinglePass,
            force_refresh: false,
            max_in_flight: None,
            countdown_tick: Duration::from_secs(1),
        }
    }
}

/// Drives the cycle state machine: performs each effect and feeds the
/// resulting messages back into [`update`].
pub struct CycleRunner {
    fetcher: Arc<dyn Fetcher>,
    target: ThreadTarget,
    settings: RunnerSettings,
    stats: Arc<RunStats>,
    countdown: Arc<dyn CountdownSink>,
}

impl CycleRunner {
    pub fn new(fetcher: Arc<dyn Fetcher>, target: ThreadTarget, settings: RunnerSettings) -> Self {
        Self {
            fetcher,
            target,
            settings,
            stats: Arc::new(RunStats::new()),
            countdown: Arc::new(TerminalCountdown),
        }
    }

    pub fn with_countdown_sink(mut self, sink: Arc<dyn CountdownSink>) -> Self {
        self.countdown = sink;
        self
    }

    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// Run cycles until single-pass mode finishes or `cancel` fires. Cancellation
    /// is observed before each page fetch and during the countdown.
    pub async fn run(&self, cancel: CancellationToken) -> RunSummary {
        let initial = CycleState::new(self.target.clone(), self.settings.mode);
        let (mut state, effects) = update(initial, Msg::Start);
        let mut pending: VecDeque<Effect> = effects.into();

        while let Some(effect) = pending.pop_front() {
            let messages = match effect {
                Effect::FetchPage { url } => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    vec![self.fetch_page(&url).await]
                }
                Effect::DispatchDownloads { links } => self.download_all(links).await,
                Effect::ReportCycle(report) => {
                    log_cycle(&report);
                    Vec::new()
                }
                Effect::StartCountdown { seconds } => {
                    let elapsed = run_countdown(
                        seconds,
                        self.settings.countdown_tick,
                        self.countdown.as_ref(),
                        &cancel,
                    )
                    .await;
                    if !elapsed {
                        break;
                    }
                    vec![Msg::CountdownElapsed]
                }
                Effect::Finish => break,
            };

            for msg in messages {
                let (next, effects) = update(state, msg);
                state = next;
                pending.extend(effects);
            }
        }

        self.stats.summary(&self.target.thread_id)
    }

    async fn fetch_page(&self, url: &str) -> Msg {
        match self.fetcher.fetch_page(url).await {
            Ok(body) => Msg::PageFetched { body },
            Err(err) => {
                engine_warn!("Could not fetch thread page {}: {}", url, err);
                Msg::PageFetchFailed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// One task per link; returns once every task has produced its outcome.
    async fn download_all(&self, links: Vec<AssetLink>) -> Vec<Msg> {
        engine_debug!("Dispatching {} downloads", links.len());
        let limiter = self
            .settings
            .max_in_flight
            .map(|limit| Arc::new(Semaphore::new(limit.get())));

        let mut tasks = JoinSet::new();
        let mut dispatched = HashMap::with_capacity(links.len());
        for link in links {
            let fetcher = Arc::clone(&self.fetcher);
            let dir = self.target.destination_dir.clone();
            let force_refresh = self.settings.force_refresh;
            let limiter = limiter.clone();
            let file_name = link.file_name.clone();
            let handle = tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                fetcher.fetch_asset(&link, &dir, force_refresh).await
            });
            dispatched.insert(handle.id(), file_name);
        }

        // Every dispatched link yields exactly one message, even when its task dies.
        let mut messages = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.unwrap_or_else(|err| {
                engine_error!("Download task did not complete: {}", err);
                let file_name = dispatched.remove(&err.id()).unwrap_or_default();
                DownloadOutcome::failed(file_name, FailureReason::WorkerPanicked)
            });
            self.stats.record(&outcome);
            log_outcome(&outcome);
            messages.push(Msg::DownloadFinished(outcome));
        }
        messages
    }
}

fn log_outcome(outcome: &DownloadOutcome) {
    match &outcome.status {
        DownloadStatus::Downloaded => engine_info!(
            "File downloaded: {} - Size: {}",
            outcome.file_name,
            format_bytes(outcome.bytes_written)
        ),
        DownloadStatus::SkippedExisting => {
            engine_debug!("Already on disk: {}", outcome.file_name)
        }
        DownloadStatus::SkippedUnsupportedSite => {
            engine_warn!("Skipping unsupported link: {}", outcome.file_name)
        }
        DownloadStatus::Failed(reason) => {
            engine_warn!("Failed to download: {} ({})", outcome.file_name, reason)
        }
    }
}

fn log_cycle(report: &CycleReport) {
    if let Some(error) = &report.page_error {
        engine_warn!("Cycle {}: thread page unavailable ({})", report.cycle, error);
        return;
    }
    engine_info!(
        "Cycle {}: {} links, {} downloaded, {} skipped, {} failed",
        report.cycle,
        report.links_found,
        report.downloaded,
        report.skipped,
        report.failed
    );
}
