// Console channel implementation
// Renders each level change as a line on stdout instead of a real pin

use colored::Colorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::warn;

use pivate_core::port::{ChannelId, OutputChannel};

/// Virtual output printing `Set pin N to high|low`
pub struct ConsoleChannel {
    index: ChannelId,
    level: AtomicBool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleChannel {
    /// Console channel writing to stdout
    pub fn new(index: ChannelId) -> Self {
        Self::with_writer(index, Box::new(io::stdout()))
    }

    /// Console channel writing to an arbitrary sink
    pub fn with_writer(index: ChannelId, out: Box<dyn Write + Send>) -> Self {
        Self {
            index,
            level: AtomicBool::new(false),
            out: Mutex::new(out),
        }
    }
}

impl OutputChannel for ConsoleChannel {
    fn id(&self) -> ChannelId {
        self.index
    }

    fn set_level(&self, level: bool) {
        self.level.store(level, Ordering::SeqCst);

        let rendered = if level { "high".green() } else { "low".red() };
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        let written =
            writeln!(out, "Set pin {} to {}", self.index, rendered).and_then(|_| out.flush());
        if let Err(e) = written {
            warn!(channel = self.index, error = %e, "Console write failed");
        }
    }

    fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}
