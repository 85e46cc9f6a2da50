// Channel bank - allocates one output channel per job at startup

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

use crate::console_channel::ConsoleChannel;
use crate::gpio_channel::{SysfsGpioChannel, SYSFS_GPIO_ROOT};
use pivate_core::error::{AppError, Result};
use pivate_core::port::{ChannelId, OutputChannel};

/// Output backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputKind {
    /// Print level changes to stdout, channels numbered from 0
    #[default]
    Console,
    /// Drive Linux sysfs GPIO pins taken from a pin list
    Gpio,
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Console => write!(f, "console"),
            OutputKind::Gpio => write!(f, "gpio"),
        }
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(OutputKind::Console),
            "gpio" => Ok(OutputKind::Gpio),
            other => Err(format!("unknown output kind '{other}' (expected console or gpio)")),
        }
    }
}

/// Allocate `count` channels of the given kind
///
/// Console channels are indexed 0..count; GPIO channels use the first
/// `count` entries of `pins`.
///
/// # Errors
/// - `AppError::Config` if GPIO output has fewer pins than jobs, or if
///   two jobs would share a pin
/// - `AppError::Io` if a GPIO pin cannot be set up
pub fn open_channels(
    kind: OutputKind,
    count: usize,
    pins: &[ChannelId],
) -> Result<Vec<Arc<dyn OutputChannel>>> {
    open_channels_at(kind, count, pins, SYSFS_GPIO_ROOT)
}

/// Same as [`open_channels`] with an explicit sysfs root
pub fn open_channels_at(
    kind: OutputKind,
    count: usize,
    pins: &[ChannelId],
    gpio_root: impl AsRef<Path>,
) -> Result<Vec<Arc<dyn OutputChannel>>> {
    let channels: Vec<Arc<dyn OutputChannel>> = match kind {
        OutputKind::Console => (0..count as ChannelId)
            .map(|index| Arc::new(ConsoleChannel::new(index)) as Arc<dyn OutputChannel>)
            .collect(),
        OutputKind::Gpio => {
            if pins.len() < count {
                return Err(AppError::Config(format!(
                    "gpio output needs one pin per job: {count} jobs but {} pins",
                    pins.len()
                )));
            }

            let pins = &pins[..count];
            let mut seen = HashSet::with_capacity(count);
            if let Some(pin) = pins.iter().find(|&&pin| !seen.insert(pin)) {
                return Err(AppError::Config(format!(
                    "gpio pin {pin} is assigned to more than one job"
                )));
            }

            let mut opened: Vec<Arc<dyn OutputChannel>> = Vec::with_capacity(count);
            for &pin in pins {
                match SysfsGpioChannel::open_at(gpio_root.as_ref(), pin) {
                    Ok(channel) => opened.push(Arc::new(channel)),
                    Err(e) => {
                        error!(pin, error = %e, "GPIO setup failed");
                        // Hand back the pins that did open
                        for channel in &opened {
                            channel.release();
                        }
                        return Err(AppError::Io(e));
                    }
                }
            }
            opened
        }
    };

    info!(kind = %kind, channels = channels.len(), "Output channels ready");
    Ok(channels)
}
