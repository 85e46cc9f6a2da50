// Reconciler - poll, map and drive every job's output channel

pub mod constants;

use constants::{DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::application::mapper::StatusMapper;
use crate::application::shutdown::ShutdownToken;
use crate::application::signal_task::SignalTask;
use crate::domain::{SignalSpec, StatusSnapshot};
use crate::error::{AppError, Result};
use crate::port::{FetchError, OutputChannel, StatusFetcher};

/// Loop timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Wait between two poll cycles
    pub poll_interval: Duration,
    /// Upper bound on one status fetch; exceeding it counts as a fetch failure
    pub fetch_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Per-cycle tally, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub on: usize,
    pub off: usize,
    pub blinking: usize,
    /// Jobs absent from the snapshot (also counted in `off`)
    pub missing: usize,
}

/// One configured job: its channel for the whole run, and its current task
struct JobSlot {
    name: String,
    channel: Arc<dyn OutputChannel>,
    task: Option<SignalTask>,
}

impl JobSlot {
    /// Replace the current task with one for `spec`
    ///
    /// The old task is fully stopped (blink loop joined) before the new one
    /// writes anything, so two tasks never race on the channel.
    async fn transition(&mut self, spec: SignalSpec, shutdown: &ShutdownToken) {
        if let Some(mut old) = self.task.take() {
            old.stop().await;
        }

        let mut task = match SignalTask::new(spec, Arc::clone(&self.channel)) {
            Ok(task) => task,
            Err(e) => {
                error!(job = %self.name, signal = %spec, error = %e, "Invalid signal, falling back to OFF");
                SignalTask::constant(false, Arc::clone(&self.channel))
            }
        };

        if let Err(e) = task.start(shutdown) {
            error!(job = %self.name, error = %e, "Failed to start signal task");
            return;
        }

        debug!(job = %self.name, channel = self.channel.id(), signal = %task.spec(), "Signal started");
        self.task = Some(task);
    }
}

/// Reconciler owns every job and drives the poll loop
///
/// `run` consumes the reconciler and always ends with `shutdown`, which also
/// consumes it, so shutdown happens exactly once.
pub struct Reconciler {
    jobs: Vec<JobSlot>,
    fetcher: Arc<dyn StatusFetcher>,
    mapper: StatusMapper,
    config: ReconcilerConfig,
    cancel: ShutdownToken,
}

impl Reconciler {
    /// Create a reconciler for `jobs`, each bound to its own channel
    ///
    /// # Errors
    /// - `AppError::Config` if a job name appears twice
    pub fn new(
        jobs: Vec<(String, Arc<dyn OutputChannel>)>,
        fetcher: Arc<dyn StatusFetcher>,
        mapper: StatusMapper,
        config: ReconcilerConfig,
        cancel: ShutdownToken,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for (name, _) in &jobs {
            if !seen.insert(name.as_str()) {
                return Err(AppError::Config(format!("duplicate job name: {name}")));
            }
        }

        let jobs = jobs
            .into_iter()
            .map(|(name, channel)| JobSlot {
                name,
                channel,
                task: None,
            })
            .collect();

        Ok(Self {
            jobs,
            fetcher,
            mapper,
            config,
            cancel,
        })
    }

    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(|slot| slot.name.as_str()).collect()
    }

    /// Signal currently driving `job`'s channel, if any
    pub fn active_signal(&self, job: &str) -> Option<SignalSpec> {
        self.jobs
            .iter()
            .find(|slot| slot.name == job)
            .and_then(|slot| slot.task.as_ref())
            .map(SignalTask::spec)
    }

    /// Active signal of every job, in configuration order
    pub fn signals(&self) -> Vec<(String, Option<SignalSpec>)> {
        self.jobs
            .iter()
            .map(|slot| (slot.name.clone(), slot.task.as_ref().map(SignalTask::spec)))
            .collect()
    }

    /// Apply one snapshot to every job
    ///
    /// Jobs missing from the snapshot are switched off.
    pub async fn reconcile_once(&mut self, snapshot: &StatusSnapshot) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for slot in &mut self.jobs {
            let status = snapshot.status_of(&slot.name);
            let spec = self.mapper.map(status);

            match (status, spec) {
                (None, _) => {
                    summary.missing += 1;
                    summary.off += 1;
                }
                (_, SignalSpec::Blink(_)) => summary.blinking += 1,
                (_, SignalSpec::Constant(true)) => summary.on += 1,
                (_, SignalSpec::Constant(false)) => summary.off += 1,
            }
            debug!(job = %slot.name, status = status.unwrap_or("<absent>"), signal = %spec, "Mapped status");

            slot.transition(spec, &self.cancel).await;
        }

        summary
    }

    /// Poll loop: fetch, reconcile, wait; until cancellation
    ///
    /// Fetch failures skip the cycle and leave every signal as it was.
    pub async fn run(self) {
        info!(
            jobs = ?self.job_names(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            fetch_timeout_ms = self.config.fetch_timeout.as_millis() as u64,
            blink_period_ms = self.mapper.config().blink_period.as_millis() as u64,
            "Reconciler started"
        );

        let mut reconciler = self;
        let mut cancel = reconciler.cancel.clone();

        loop {
            // Check for shutdown signal
            if cancel.is_shutdown() {
                info!("Reconciler shutting down");
                break;
            }

            let fetched = tokio::select! {
                result = reconciler.fetch() => result,
                _ = cancel.wait() => {
                    info!("Reconciler interrupted during fetch");
                    break;
                }
            };

            match fetched {
                Ok(snapshot) => {
                    let summary = reconciler.reconcile_once(&snapshot).await;
                    info!(
                        on = summary.on,
                        off = summary.off,
                        blinking = summary.blinking,
                        missing = summary.missing,
                        "Reconciliation cycle completed"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Status fetch failed, keeping current signals");
                }
            }

            tokio::select! {
                _ = sleep(reconciler.config.poll_interval) => {},
                _ = cancel.wait() => {
                    info!("Reconciler interrupted during wait");
                    break;
                }
            }
        }

        reconciler.shutdown().await;
    }

    /// Stop every job's task, then release every channel
    pub async fn shutdown(mut self) {
        info!(jobs = self.jobs.len(), "Stopping all signal tasks...");
        for (job, signal) in self.signals() {
            debug!(job = %job, signal = ?signal, "Last active signal");
        }

        join_all(
            self.jobs
                .iter_mut()
                .filter_map(|slot| slot.task.as_mut())
                .map(SignalTask::stop),
        )
        .await;

        for slot in &self.jobs {
            slot.channel.release();
        }

        info!("Reconciler stopped, all outputs released");
    }

    async fn fetch(&self) -> std::result::Result<StatusSnapshot, FetchError> {
        match timeout(self.config.fetch_timeout, self.fetcher.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.config.fetch_timeout)),
        }
    }
}
