//! Pivate Eye - Main Entry Point
//! Polls a CI endpoint and mirrors each job's status on one output channel

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

// Import workspace crates
use pivate_core::application::{shutdown_channel, Reconciler, ShutdownSender, StatusMapper};
use pivate_core::port::{OutputChannel, StatusFetcher};
use pivate_infra_http::HttpStatusFetcher;
use pivate_infra_system::open_channels;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse arguments (usage errors exit with status 2)
    let cli = Cli::parse();

    // 2. Initialize logging
    let _log_guard = logging::init();

    info!("Pivate Eye v{} starting...", pivate_core::VERSION);

    // 3. Load configuration
    let settings = cli.into_settings()?;
    info!(
        endpoint = %settings.endpoint,
        jobs = ?settings.jobs,
        output = %settings.output,
        "Configuration loaded"
    );

    // 4. Setup dependencies (DI wiring)
    let fetcher: Arc<dyn StatusFetcher> = Arc::new(HttpStatusFetcher::new(
        &settings.endpoint,
        settings.reconciler.fetch_timeout,
    )?);

    let channels = open_channels(settings.output, settings.jobs.len(), &settings.pins)?;
    let jobs: Vec<(String, Arc<dyn OutputChannel>)> =
        settings.jobs.into_iter().zip(channels).collect();

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let reconciler = Reconciler::new(
        jobs,
        fetcher,
        StatusMapper::new(settings.mapper),
        settings.reconciler,
        shutdown_rx,
    )?;

    // 5. Start the poll loop
    let reconciler_handle = tokio::spawn(reconciler.run());

    info!("System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal, then stop and release every output
    run_until_signal(wait_for_signal(), shutdown_tx, reconciler_handle).await?;

    info!("Shutdown complete.");

    Ok(())
}

/// Wait for `signal`, then shut the reconciler down and join it
///
/// The reconciler is joined even when `signal` fails, so outputs are
/// always released before the error is returned.
async fn run_until_signal(
    signal: impl Future<Output = Result<()>>,
    shutdown_tx: ShutdownSender,
    mut reconciler_handle: JoinHandle<()>,
) -> Result<()> {
    let signal_result = tokio::select! {
        result = signal => result,
        joined = &mut reconciler_handle => {
            // run() only returns after cancellation, so this is a crash
            if let Err(e) = joined {
                error!(error = ?e, "Reconciler failed");
            }
            anyhow::bail!("Reconciler exited unexpectedly");
        }
    };

    match &signal_result {
        Ok(()) => info!("Shutdown signal received. Stopping outputs..."),
        Err(e) => error!(error = %e, "Signal handling failed. Stopping outputs..."),
    }

    // Graceful shutdown: run() finishes with Reconciler::shutdown
    shutdown_tx.shutdown();
    reconciler_handle.await?;

    signal_result
}

/// Resolve on Ctrl+C, or SIGTERM on unix
async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
