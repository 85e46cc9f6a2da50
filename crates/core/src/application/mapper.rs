// Status Mapper - job status to desired output signal

use std::collections::BTreeSet;
use std::time::Duration;

use super::reconciler::constants::{
    DEFAULT_ANIMATED_SUFFIX, DEFAULT_BLINK_PERIOD, DEFAULT_POSITIVE_STATUSES,
};
use crate::domain::SignalSpec;
use crate::error::{AppError, Result};

/// Mapping policy, substitutable per deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Suffix marking an in-progress ("animated") status
    pub animated_suffix: String,
    /// Statuses shown as a steady "on" output
    pub positive_statuses: BTreeSet<String>,
    /// Toggle period for animated statuses
    pub blink_period: Duration,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            animated_suffix: DEFAULT_ANIMATED_SUFFIX.to_string(),
            positive_statuses: DEFAULT_POSITIVE_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            blink_period: DEFAULT_BLINK_PERIOD,
        }
    }
}

impl MapperConfig {
    /// Reject policies that would make every status look animated
    ///
    /// A zero blink period is deliberately not rejected here: it surfaces
    /// per job as `InvalidParameter` when the signal task is built.
    pub fn validate(&self) -> Result<()> {
        if self.animated_suffix.is_empty() {
            return Err(AppError::Config(
                "animated suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pure status -> signal mapping
#[derive(Debug, Clone, Default)]
pub struct StatusMapper {
    config: MapperConfig,
}

impl StatusMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Map a job's status (or its absence) to a signal
    ///
    /// Rules, first match wins:
    /// 1. absent -> steady off
    /// 2. ends with the animated suffix -> blink
    /// 3. steady on iff the status is in the positive set
    pub fn map(&self, status: Option<&str>) -> SignalSpec {
        let Some(status) = status else {
            return SignalSpec::OFF;
        };

        if status.ends_with(self.config.animated_suffix.as_str()) {
            return SignalSpec::Blink(self.config.blink_period);
        }

        SignalSpec::Constant(self.config.positive_statuses.contains(status))
    }
}
