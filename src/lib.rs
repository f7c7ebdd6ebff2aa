pub mod analytics;
pub mod arm;
pub mod audio;
pub mod cli;
mod commands;
pub mod models;
pub mod reaction;
mod settings;
pub mod trace;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use cli::Cli;

const ENABLE_LOGS: bool = true;

/// How long the worker gets after an interrupt to finish its current arm command and release the pump.
const INTERRUPT_GRACE: Duration = Duration::from_secs(10);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    crate::log_info!("maskbot starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let result = runtime.block_on(supervise(cli, CancellationToken::new()));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

/// Run the command on a blocking worker; an interrupt cancels it and ends the process cleanly.
async fn supervise(cli: Cli, cancel_token: CancellationToken) -> Result<()> {
    let worker_token = cancel_token.clone();
    let mut worker = tokio::task::spawn_blocking(move || commands::execute(cli, &worker_token));

    tokio::select! {
        joined = &mut worker => joined.context("worker thread failed to join")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for interrupt")?;
            cancel_token.cancel();
            crate::log_warn!("Closing program");
            if tokio::time::timeout(INTERRUPT_GRACE, &mut worker).await.is_err() {
                crate::log_warn!("worker still busy after {}s, exiting anyway", INTERRUPT_GRACE.as_secs());
            }
            Ok(())
        }
    }
}
