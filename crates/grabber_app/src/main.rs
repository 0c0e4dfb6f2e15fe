mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_info, engine_warn};
use grabber_core::{CoreError, RunMode, SiteProfile, ThreadTarget};
use grabber_engine::{ensure_output_dir, CancellationToken, CycleRunner, ReqwestFetcher};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    engine_logging::initialize(cli.log_level(), cli.log_file.as_deref());

    let target = match ThreadTarget::from_url(&cli.url, &cli.output) {
        Ok(target) => target,
        Err(err) => {
            if matches!(err, CoreError::UnsupportedSite { .. }) {
                eprintln!("{}", supported_sites());
            }
            return Err(err).with_context(|| format!("cannot harvest {}", cli.url));
        }
    };

    println!("thread-grabber {}", env!("CARGO_PKG_VERSION"));
    engine_info!("[*] DOWNLOAD STARTED ({}) [*]", target.source_url);
    let settings = cli.runner_settings();
    if let RunMode::Monitor { interval_secs } = settings.mode {
        engine_info!("[*] MONITOR MODE ENABLED, every {}s [*]", interval_secs);
    }

    ensure_output_dir(&target.destination_dir).with_context(|| {
        format!(
            "cannot create output directory {}",
            target.destination_dir.display()
        )
    })?;
    engine_info!("Saving into {}", target.destination_dir.display());

    let fetcher = ReqwestFetcher::new(cli.fetch_settings()).context("cannot build http client")?;
    let thread_id = target.thread_id.clone();
    let runner = CycleRunner::new(Arc::new(fetcher), target, settings);
    let stats = runner.stats();
    let cancel = CancellationToken::new();

    let summary = tokio::select! {
        summary = runner.run(cancel.clone()) => summary,
        () = interrupted() => {
            cancel.cancel();
            stats.summary(&thread_id)
        }
    };

    println!("\n{summary}");
    Ok(())
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        engine_warn!("Ctrl+C handler unavailable: {}", err);
        std::future::pending::<()>().await;
    }
}

fn supported_sites() -> String {
    let mut text = String::from("Supported sites:");
    for site in SiteProfile::ALL {
        text.push_str(&format!("\n  {:<10} {}", site.id(), site.example_thread_url()));
    }
    text
}
