// Output Channel Port
// One physical or virtual binary output (GPIO pin, console line) per job

/// Channel identifier: a 0-based index or a hardware pin number
pub type ChannelId = u32;

/// Binary output capability
///
/// Implementations:
/// - ConsoleChannel: prints level changes to stdout
/// - SysfsGpioChannel: drives a Linux GPIO pin
///
/// Writes never fail from the caller's point of view; adapters log driver
/// failures and carry on. Only the currently-active signal task of a job
/// writes to its channel, so implementations need no locking beyond what
/// makes `level()` readable from other tasks.
pub trait OutputChannel: Send + Sync {
    /// Identifier assigned at startup
    fn id(&self) -> ChannelId;

    /// Drive the output to `level` (`true` = high / on)
    fn set_level(&self, level: bool);

    /// Last level requested through `set_level`
    fn level(&self) -> bool;

    /// Invert the current level
    fn toggle(&self) {
        self.set_level(!self.level());
    }

    /// Release any held driver resources (called once, at shutdown)
    fn release(&self) {}
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// One recorded `set_level` call
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChannelWrite {
        pub at: Instant,
        pub level: bool,
    }

    /// Channel that records every write with its (tokio) timestamp
    pub struct RecordingChannel {
        id: ChannelId,
        level: AtomicBool,
        released: AtomicBool,
        writes: Mutex<Vec<ChannelWrite>>,
    }

    impl RecordingChannel {
        pub fn new(id: ChannelId) -> Self {
            Self {
                id,
                level: AtomicBool::new(false),
                released: AtomicBool::new(false),
                writes: Mutex::new(Vec::new()),
            }
        }

        pub fn writes(&self) -> Vec<ChannelWrite> {
            self.writes.lock().unwrap().clone()
        }

        pub fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }

        pub fn levels(&self) -> Vec<bool> {
            self.writes().iter().map(|w| w.level).collect()
        }

        pub fn is_released(&self) -> bool {
            self.released.load(Ordering::SeqCst)
        }
    }

    impl OutputChannel for RecordingChannel {
        fn id(&self) -> ChannelId {
            self.id
        }

        fn set_level(&self, level: bool) {
            self.writes.lock().unwrap().push(ChannelWrite {
                at: Instant::now(),
                level,
            });
            self.level.store(level, Ordering::SeqCst);
        }

        fn level(&self) -> bool {
            self.level.load(Ordering::SeqCst)
        }

        fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::RecordingChannel;
    use super::OutputChannel;

    #[test]
    fn test_toggle_starts_from_current_level() {
        let channel = RecordingChannel::new(0);
        channel.toggle();
        channel.toggle();
        channel.set_level(true);
        channel.toggle();
        assert_eq!(channel.levels(), vec![true, false, true, false]);
        assert!(!channel.level());
    }
}
