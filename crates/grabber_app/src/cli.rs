use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use grabber_core::RunMode;
use grabber_engine::{FetchSettings, RetryPolicy, RunnerSettings};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "thread-grabber", version)]
#[command(about = "Download every image in a board thread, optionally watching it for new posts")]
pub struct Cli {
    /// Thread url, e.g. https://boards.4chan.org/w/thread/1234567
    pub url: String,

    /// Keep checking the thread, waiting SECONDS between passes, until Ctrl+C
    #[arg(long, value_name = "SECONDS")]
    pub monitor: Option<u64>,

    /// Requests per file before giving up
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Pause between attempts for one file
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    pub retry_delay: u64,

    /// Download files again even if they are already on disk
    #[arg(long)]
    pub force: bool,

    /// Root directory; files go to OUTPUT/<board>/<thread>
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Limit concurrent downloads per pass (default: all at once)
    #[arg(long, value_name = "N")]
    pub max_in_flight: Option<NonZeroUsize>,

    /// Also write the log to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log retries and skipped files
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            retry: RetryPolicy {
                max_attempts: self.retries,
                delay: Duration::from_secs(self.retry_delay),
            },
            ..FetchSettings::default()
        }
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        let mode = match self.monitor {
            Some(interval_secs) => RunMode::Monitor { interval_secs },
            None => RunMode::SinglePass,
        };
        RunnerSettings {
            mode,
            force_refresh: self.force,
            max_in_flight: self.max_in_flight,
            ..RunnerSettings::default()
        }
    }
}
