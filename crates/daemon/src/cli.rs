//! CLI argument definitions.
//!
//! Every option falls back to a `PIVATE_*` environment variable.

use anyhow::Result;
use clap::Parser;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

use pivate_core::application::reconciler::constants::{
    DEFAULT_ANIMATED_SUFFIX, DEFAULT_BLINK_PERIOD, DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL,
    DEFAULT_POSITIVE_STATUSES,
};
use pivate_core::application::{MapperConfig, ReconcilerConfig};
use pivate_core::port::ChannelId;
use pivate_infra_system::OutputKind;

/// Top-level CLI parser for `pivate-eye`.
#[derive(Debug, Parser)]
#[command(name = "pivate-eye", version, about = "Show CI job statuses on indicator lights")]
pub struct Cli {
    /// Status endpoint returning a Jenkins-style job list (e.g. http://ci:8080/api/json)
    pub endpoint: String,

    /// Job names; each gets one output channel, in order
    #[arg(required = true, num_args = 1..)]
    pub jobs: Vec<String>,

    /// Seconds between two polls of the endpoint
    #[arg(long, env = "PIVATE_POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval_secs: u64,

    /// Blink half-period in milliseconds (one toggle per period)
    #[arg(long, env = "PIVATE_BLINK_PERIOD_MS", default_value_t = DEFAULT_BLINK_PERIOD.as_millis() as u64)]
    pub blink_period_ms: u64,

    /// Seconds before a status fetch is abandoned
    #[arg(long, env = "PIVATE_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout_secs: u64,

    /// Status suffix that makes a job blink
    #[arg(long, env = "PIVATE_ANIMATED_SUFFIX", default_value = DEFAULT_ANIMATED_SUFFIX)]
    pub animated_suffix: String,

    /// Statuses shown as a steady light (comma separated)
    #[arg(
        long = "positive",
        env = "PIVATE_POSITIVE_STATUSES",
        value_delimiter = ',',
        default_values_t = DEFAULT_POSITIVE_STATUSES.iter().map(ToString::to_string).collect::<Vec<String>>()
    )]
    pub positive_statuses: Vec<String>,

    /// Output backend: console or gpio
    #[arg(long, env = "PIVATE_OUTPUT", default_value_t = OutputKind::Console)]
    pub output: OutputKind,

    /// BCM pin numbers for gpio output, one per job (comma separated)
    #[arg(long, env = "PIVATE_PINS", value_delimiter = ',')]
    pub pins: Vec<ChannelId>,
}

/// Validated runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub jobs: Vec<String>,
    pub reconciler: ReconcilerConfig,
    pub mapper: MapperConfig,
    pub output: OutputKind,
    pub pins: Vec<ChannelId>,
}

impl Cli {
    /// Turn raw arguments into settings
    ///
    /// Repeated job names are collapsed (first occurrence wins).
    ///
    /// # Errors
    /// Returns an error if the mapping policy is unusable or a duration is zero
    pub fn into_settings(self) -> Result<Settings> {
        if self.poll_interval_secs == 0 {
            anyhow::bail!("--poll-interval-secs must be greater than zero");
        }
        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("--fetch-timeout-secs must be greater than zero");
        }

        let mapper = MapperConfig {
            animated_suffix: self.animated_suffix,
            positive_statuses: self
                .positive_statuses
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            blink_period: Duration::from_millis(self.blink_period_ms),
        };
        mapper.validate()?;

        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(self.jobs.len());
        for job in self.jobs {
            if seen.insert(job.clone()) {
                jobs.push(job);
            } else {
                warn!(job = %job, "Job listed twice, ignoring the repeat");
            }
        }

        Ok(Settings {
            endpoint: self.endpoint,
            jobs,
            reconciler: ReconcilerConfig {
                poll_interval: Duration::from_secs(self.poll_interval_secs),
                fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            },
            mapper,
            output: self.output,
            pins: self.pins,
        })
    }
}
