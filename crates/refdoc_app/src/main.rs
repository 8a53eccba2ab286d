mod cli;
mod config;
mod progress;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use engine_logging::{engine_error, engine_info, engine_warn};
use refdoc_engine::{Harvester, HttpSourceFactory};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::progress::ConsoleSink;

/// Ran to completion but nothing was harvested.
const EXIT_EMPTY: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    engine_logging::initialize(cli.log_to.into(), Some(cli.log_file.as_path()), cli.log_level.into());

    match run(&cli).await {
        Ok(0) => ExitCode::from(EXIT_EMPTY),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("Harvest failed: {:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Returns the number of records harvested.
async fn run(cli: &Cli) -> Result<usize> {
    let config = config::resolve(cli)?;
    engine_info!(
        "Harvesting {} with {} workers into {:?}",
        config.index_url,
        config.workers,
        config.output_path
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let factory = Arc::new(HttpSourceFactory::from_config(&config));
    let harvester = Harvester::new(config, factory).with_sink(Arc::new(ConsoleSink::new()));
    let outcome = harvester.run(cancel).await?;

    let summary = outcome.summary;
    if summary.cancelled {
        engine_warn!("Harvest interrupted; partial results were saved");
    }
    engine_info!(
        "harvested {} of {} discovered ({} failed, {} skipped)",
        summary.harvested,
        summary.discovered,
        summary.failed,
        summary.skipped
    );
    Ok(outcome.records.len())
}

/// First Ctrl-C stops dispatching new pages; in-flight pages finish.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            engine_warn!("Interrupt received, finishing in-flight pages");
            cancel.cancel();
        }
    });
}
