// Pivate Eye Infrastructure - Output Adapters
// Implements: OutputChannel (console lines, Linux sysfs GPIO pins)

pub mod channel_bank;
pub mod console_channel;
pub mod gpio_channel;

pub use channel_bank::{open_channels, open_channels_at, OutputKind};
pub use console_channel::ConsoleChannel;
pub use gpio_channel::{SysfsGpioChannel, SYSFS_GPIO_ROOT};
