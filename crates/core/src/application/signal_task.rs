// Signal Task - the active visual behavior bound to one output channel

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
use crate::domain::error::{DomainError, Result};
use crate::domain::SignalSpec;
use crate::port::OutputChannel;

/// Lifecycle: Idle -> Running -> Stopped (terminal)
enum TaskState {
    Idle,
    Running(Option<BlinkHandle>),
    Stopped,
}

impl TaskState {
    fn as_str(&self) -> &'static str {
        match self {
            TaskState::Idle => "IDLE",
            TaskState::Running(_) => "RUNNING",
            TaskState::Stopped => "STOPPED",
        }
    }
}

/// Background toggling activity of a running blink task
struct BlinkHandle {
    stop: ShutdownSender,
    handle: JoinHandle<()>,
}

impl BlinkHandle {
    /// Signal the blink loop and wait until it has exited
    async fn stop(self) {
        self.stop.shutdown();
        if let Err(join_err) = self.handle.await {
            if join_err.is_panic() {
                warn!(error = ?join_err, "Blink task panicked");
            }
        }
    }
}

/// A `Constant` or `Blink` signal driving one channel
///
/// The channel is shared, not owned: the reconciler keeps it across tasks.
/// Dropping a running blink task without `stop()` still ends its background
/// loop at the next scheduling point, but only `stop()` waits for it.
pub struct SignalTask {
    spec: SignalSpec,
    channel: Arc<dyn OutputChannel>,
    state: TaskState,
}

impl SignalTask {
    /// Create an idle task
    ///
    /// # Errors
    /// - `DomainError::InvalidParameter` for a blink with a zero period
    pub fn new(spec: SignalSpec, channel: Arc<dyn OutputChannel>) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            channel,
            state: TaskState::Idle,
        })
    }

    /// Create an idle constant task (cannot fail)
    pub fn constant(level: bool, channel: Arc<dyn OutputChannel>) -> Self {
        Self {
            spec: SignalSpec::Constant(level),
            channel,
            state: TaskState::Idle,
        }
    }

    pub fn spec(&self) -> SignalSpec {
        self.spec
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TaskState::Running(_))
    }

    /// Start driving the channel
    ///
    /// `Constant` writes its level once. `Blink` spawns a loop that toggles
    /// the channel immediately and then every period, until `stop()` or
    /// until `shutdown` fires.
    ///
    /// # Errors
    /// - `DomainError::InvalidStateTransition` unless the task is idle
    pub fn start(&mut self, shutdown: &ShutdownToken) -> Result<()> {
        if !matches!(self.state, TaskState::Idle) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.as_str().to_string(),
                to: "RUNNING".to_string(),
            });
        }

        let blink = match self.spec {
            SignalSpec::Constant(level) => {
                self.channel.set_level(level);
                None
            }
            SignalSpec::Blink(period) => Some(spawn_blink(
                Arc::clone(&self.channel),
                period,
                shutdown.clone(),
            )),
        };

        self.state = TaskState::Running(blink);
        Ok(())
    }

    /// Stop driving the channel
    ///
    /// Idempotent, and a no-op for a task that never started. When this
    /// returns, the task performs no further writes. The channel keeps
    /// whatever level was written last.
    pub async fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        if let TaskState::Running(Some(blink)) =
            std::mem::replace(&mut self.state, TaskState::Stopped)
        {
            blink.stop().await;
        }
    }
}

fn spawn_blink(
    channel: Arc<dyn OutputChannel>,
    period: Duration,
    shutdown: ShutdownToken,
) -> BlinkHandle {
    let (stop, stop_token) = shutdown_channel();
    let handle = tokio::spawn(blink_loop(channel, period, stop_token, shutdown));
    BlinkHandle { stop, handle }
}

async fn blink_loop(
    channel: Arc<dyn OutputChannel>,
    period: Duration,
    mut stop: ShutdownToken,
    mut shutdown: ShutdownToken,
) {
    debug!(channel = channel.id(), period_ms = period.as_millis() as u64, "Blink started");

    // First tick completes immediately
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Cancellation is checked before every toggle
        tokio::select! {
            biased;
            _ = stop.wait() => break,
            _ = shutdown.wait() => break,
            _ = tick.tick() => channel.toggle(),
        }
    }

    debug!(channel = channel.id(), "Blink stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::output_channel::mocks::RecordingChannel;

    const PERIOD: Duration = Duration::from_millis(100);

    fn recording() -> (Arc<RecordingChannel>, Arc<dyn OutputChannel>) {
        let channel = Arc::new(RecordingChannel::new(0));
        let shared: Arc<dyn OutputChannel> = channel.clone();
        (channel, shared)
    }

    #[tokio::test]
    async fn test_constant_writes_once() {
        let (_tx, token) = shutdown_channel();
        let (channel, shared) = recording();

        let mut task = SignalTask::new(SignalSpec::Constant(true), shared).unwrap();
        assert_eq!(channel.write_count(), 0);

        task.start(&token).unwrap();
        assert!(task.is_running());
        assert_eq!(channel.levels(), vec![true]);

        task.stop().await;
        assert!(!task.is_running());
        assert_eq!(channel.levels(), vec![true]);
        assert!(channel.level());
    }

    #[test]
    fn test_zero_period_rejected() {
        let (_, shared) = recording();
        let err = SignalTask::new(SignalSpec::Blink(Duration::ZERO), shared)
            .err()
            .unwrap();
        assert!(matches!(err, DomainError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let (_tx, token) = shutdown_channel();
        let (channel, shared) = recording();
        let mut task = SignalTask::new(SignalSpec::Blink(PERIOD), shared).unwrap();

        task.stop().await;
        task.stop().await;
        assert_eq!(channel.write_count(), 0);

        // Still idle, so it can start
        task.start(&token).unwrap();
        task.stop().await;
    }

    #[tokio::test]
    async fn test_start_twice_rejected() {
        let (_tx, token) = shutdown_channel();
        let (_, shared) = recording();
        let mut task = SignalTask::constant(false, shared);

        task.start(&token).unwrap();
        assert!(matches!(
            task.start(&token),
            Err(DomainError::InvalidStateTransition { .. })
        ));

        task.stop().await;
        assert!(matches!(
            task.start(&token),
            Err(DomainError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blink_toggles_every_period() {
        let (_tx, token) = shutdown_channel();
        let (channel, shared) = recording();
        let mut task = SignalTask::new(SignalSpec::Blink(PERIOD), shared).unwrap();

        let started = tokio::time::Instant::now();
        task.start(&token).unwrap();
        tokio::time::sleep(PERIOD * 3 + PERIOD / 2).await;
        task.stop().await;

        // Toggles at 0, 1, 2 and 3 periods, starting from low
        assert_eq!(channel.levels(), vec![true, false, true, false]);
        let offsets: Vec<Duration> = channel
            .writes()
            .iter()
            .map(|w| w.at.duration_since(started))
            .collect();
        assert_eq!(offsets, vec![Duration::ZERO, PERIOD, PERIOD * 2, PERIOD * 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blink_starts_from_current_level() {
        let (_tx, token) = shutdown_channel();
        let (channel, shared) = recording();
        channel.set_level(true);

        let mut task = SignalTask::new(SignalSpec::Blink(PERIOD), shared).unwrap();
        task.start(&token).unwrap();
        tokio::time::sleep(PERIOD / 2).await;
        task.stop().await;

        assert_eq!(channel.levels(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_writes_after_stop() {
        let (_tx, token) = shutdown_channel();
        let (channel, shared) = recording();
        let mut task = SignalTask::new(SignalSpec::Blink(PERIOD), shared).unwrap();

        task.start(&token).unwrap();
        tokio::time::sleep(PERIOD * 2).await;
        task.stop().await;
        let after_stop = channel.write_count();
        let level_after_stop = channel.level();

        tokio::time::sleep(PERIOD * 10).await;
        assert_eq!(channel.write_count(), after_stop);

        // Second stop changes nothing
        task.stop().await;
        assert_eq!(channel.write_count(), after_stop);
        assert_eq!(channel.level(), level_after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_shutdown_ends_blink() {
        let (tx, token) = shutdown_channel();
        let (channel, shared) = recording();
        let mut task = SignalTask::new(SignalSpec::Blink(PERIOD), shared).unwrap();

        task.start(&token).unwrap();
        tokio::time::sleep(PERIOD + PERIOD / 2).await;
        tx.shutdown();
        tokio::task::yield_now().await;
        let at_shutdown = channel.write_count();

        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(channel.write_count(), at_shutdown);
        task.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_running_task_ends_blink() {
        let (_tx, token) = shutdown_channel();
        let (channel, shared) = recording();
        let mut task = SignalTask::new(SignalSpec::Blink(PERIOD), shared).unwrap();

        task.start(&token).unwrap();
        tokio::time::sleep(PERIOD / 2).await;
        drop(task);
        tokio::task::yield_now().await;
        let after_drop = channel.write_count();

        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(channel.write_count(), after_drop);
    }
}
