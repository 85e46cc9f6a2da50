// Reconciler constants (no magic values)
use std::time::Duration;

/// Pause between two poll cycles (10s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Half-period of a blinking output: one toggle per period (1s)
pub const DEFAULT_BLINK_PERIOD: Duration = Duration::from_secs(1);

/// Upper bound on a single status fetch (5s)
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Status suffix marking a job as in progress (Jenkins "animated" colors)
pub const DEFAULT_ANIMATED_SUFFIX: &str = "_anime";

/// Statuses rendered as a steady "on" output
pub const DEFAULT_POSITIVE_STATUSES: &[&str] = &["blue", "yellow"];
