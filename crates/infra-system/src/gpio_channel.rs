// Sysfs GPIO channel implementation
// reason: the legacy sysfs interface needs nothing beyond std::fs and works
// on every Raspberry Pi kernel that still ships /sys/class/gpio

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use pivate_core::port::{ChannelId, OutputChannel};

/// Root of the kernel's sysfs GPIO interface
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Writes tried on a freshly exported pin before giving up
const EXPORT_SETTLE_ATTEMPTS: u32 = 20;
const EXPORT_SETTLE_DELAY: Duration = Duration::from_millis(25);

/// Hardware output on one BCM-numbered GPIO pin
///
/// The pin is exported and configured as a low output when opened, and
/// driven low and unexported on `release`.
pub struct SysfsGpioChannel {
    pin: ChannelId,
    root: PathBuf,
    value_path: PathBuf,
    level: AtomicBool,
    released: AtomicBool,
}

impl SysfsGpioChannel {
    /// Open `pin` under the standard sysfs root
    ///
    /// # Errors
    /// Returns the I/O error if the pin cannot be exported or configured
    pub fn open(pin: ChannelId) -> io::Result<Self> {
        Self::open_at(SYSFS_GPIO_ROOT, pin)
    }

    /// Open `pin` under an arbitrary sysfs-like root
    ///
    /// # Errors
    /// Returns the I/O error if the pin cannot be exported or configured
    pub fn open_at(root: impl AsRef<Path>, pin: ChannelId) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let pin_dir = root.join(format!("gpio{pin}"));

        let exported = !pin_dir.exists();
        if exported {
            debug!(pin, "Exporting GPIO pin");
            fs::write(root.join("export"), pin.to_string())?;
        }

        // "low" selects output mode with an initial low level in one write
        let direction = pin_dir.join("direction");
        if exported {
            write_after_export(&direction, "low")?;
        } else {
            fs::write(&direction, "low")?;
        }

        Ok(Self {
            pin,
            root,
            value_path: pin_dir.join("value"),
            level: AtomicBool::new(false),
            released: AtomicBool::new(false),
        })
    }

    fn write_value(&self, level: bool) -> io::Result<()> {
        fs::write(&self.value_path, if level { "1" } else { "0" })
    }
}

/// Write a file of a freshly exported pin
///
/// udev creates the pin's files and fixes their permissions asynchronously
/// after an export, so early writes may see `NotFound` or `PermissionDenied`.
fn write_after_export(path: &Path, contents: &str) -> io::Result<()> {
    let mut attempt = 1;
    loop {
        match fs::write(path, contents) {
            Err(e)
                if attempt < EXPORT_SETTLE_ATTEMPTS
                    && matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                    ) =>
            {
                debug!(path = %path.display(), attempt, error = %e, "GPIO pin not ready yet");
                thread::sleep(EXPORT_SETTLE_DELAY);
                attempt += 1;
            }
            result => return result,
        }
    }
}

impl OutputChannel for SysfsGpioChannel {
    fn id(&self) -> ChannelId {
        self.pin
    }

    fn set_level(&self, level: bool) {
        self.level.store(level, Ordering::SeqCst);
        if let Err(e) = self.write_value(level) {
            warn!(pin = self.pin, level, error = %e, "GPIO write failed");
        }
    }

    fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        self.level.store(false, Ordering::SeqCst);
        if let Err(e) = self.write_value(false) {
            warn!(pin = self.pin, error = %e, "Failed to drive GPIO pin low on release");
        }
        if let Err(e) = fs::write(self.root.join("unexport"), self.pin.to_string()) {
            warn!(pin = self.pin, error = %e, "Failed to unexport GPIO pin");
        }
        debug!(pin = self.pin, "GPIO pin released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fake sysfs tree with pre-exported pins
    fn fake_sysfs(name: &str, pins: &[u32]) -> PathBuf {
        let root = std::env::temp_dir().join(format!("pivate_gpio_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        for pin in pins {
            fs::create_dir_all(root.join(format!("gpio{pin}"))).unwrap();
        }
        root
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_open_configures_low_output() {
        let root = fake_sysfs("open", &[17]);
        let channel = SysfsGpioChannel::open_at(&root, 17).unwrap();

        assert_eq!(channel.id(), 17);
        assert!(!channel.level());
        assert_eq!(read(root.join("gpio17/direction")), "low");
        // Already exported, so no export write
        assert!(!root.join("export").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_set_level_writes_value() {
        let root = fake_sysfs("write", &[4]);
        let channel = SysfsGpioChannel::open_at(&root, 4).unwrap();

        channel.set_level(true);
        assert_eq!(read(root.join("gpio4/value")), "1");
        channel.toggle();
        assert_eq!(read(root.join("gpio4/value")), "0");
        assert!(!channel.level());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_release_drives_low_and_unexports_once() {
        let root = fake_sysfs("release", &[22]);
        let channel = SysfsGpioChannel::open_at(&root, 22).unwrap();
        channel.set_level(true);

        channel.release();
        assert_eq!(read(root.join("gpio22/value")), "0");
        assert_eq!(read(root.join("unexport")), "22");

        fs::remove_file(root.join("unexport")).unwrap();
        channel.release();
        assert!(!root.join("unexport").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_unexported_pin_is_exported_first() {
        let root = fake_sysfs("export", &[]);

        // A plain directory never creates gpio27/ on export, so the
        // direction write still fails once the retries run out
        let result = SysfsGpioChannel::open_at(&root, 27);
        assert!(result.is_err());
        assert_eq!(read(root.join("export")), "27");

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_waits_for_exported_pin_to_appear() {
        let root = fake_sysfs("settle", &[]);

        // Stand-in for udev creating gpio23/ some time after the export
        let pin_dir = root.join("gpio23");
        let creator = thread::spawn(move || {
            thread::sleep(Duration::from_millis(60));
            fs::create_dir_all(pin_dir).unwrap();
        });

        let channel = SysfsGpioChannel::open_at(&root, 23).unwrap();
        creator.join().unwrap();

        assert_eq!(read(root.join("export")), "23");
        assert_eq!(read(root.join("gpio23/direction")), "low");
        channel.set_level(true);
        assert_eq!(read(root.join("gpio23/value")), "1");

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let root = fake_sysfs("broken", &[5]);
        let channel = SysfsGpioChannel::open_at(&root, 5).unwrap();
        fs::remove_dir_all(root.join("gpio5")).unwrap();

        channel.set_level(true);
        assert!(channel.level());

        let _ = fs::remove_dir_all(&root);
    }
}
