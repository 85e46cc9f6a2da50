//! Output Adapter Tests
//!
//! The reconciler driving the real console and sysfs GPIO adapters.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pivate_core::application::{
    shutdown_channel, MapperConfig, Reconciler, ReconcilerConfig, ShutdownSender, StatusMapper,
};
use pivate_core::domain::StatusSnapshot;
use pivate_core::port::status_fetcher::mocks::ScriptedFetcher;
use pivate_core::port::OutputChannel;
use pivate_infra_system::{open_channels_at, ConsoleChannel, OutputKind};

const BLINK: Duration = Duration::from_millis(500);

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn snapshot(entries: &[(&str, &str)]) -> StatusSnapshot {
    entries.iter().copied().collect()
}

/// The sender must outlive the test; dropping it cancels every task
fn build_reconciler(jobs: Vec<(String, Arc<dyn OutputChannel>)>) -> (Reconciler, ShutdownSender) {
    let (tx, token) = shutdown_channel();
    let reconciler = Reconciler::new(
        jobs,
        Arc::new(ScriptedFetcher::new(vec![])),
        StatusMapper::new(MapperConfig {
            blink_period: BLINK,
            ..MapperConfig::default()
        }),
        ReconcilerConfig::default(),
        token,
    )
    .unwrap();
    (reconciler, tx)
}

fn fake_sysfs(name: &str, pins: &[u32]) -> PathBuf {
    let root = std::env::temp_dir().join(format!("pivate_it_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    for pin in pins {
        fs::create_dir_all(root.join(format!("gpio{pin}"))).unwrap();
    }
    root
}

#[tokio::test(start_paused = true)]
async fn test_console_prints_one_line_per_level_change() {
    let steady = Capture::default();
    let blinking = Capture::default();
    let channels: Vec<Arc<dyn OutputChannel>> = vec![
        Arc::new(ConsoleChannel::with_writer(0, Box::new(steady.clone()))),
        Arc::new(ConsoleChannel::with_writer(1, Box::new(blinking.clone()))),
    ];
    let jobs = vec!["build".to_string(), "deploy".to_string()];
    let (mut reconciler, _tx) = build_reconciler(jobs.into_iter().zip(channels).collect());

    reconciler
        .reconcile_once(&snapshot(&[("build", "blue"), ("deploy", "red_anime")]))
        .await;
    tokio::time::sleep(BLINK * 2 + BLINK / 2).await;
    reconciler.shutdown().await;

    let steady = steady.lines();
    assert_eq!(steady.len(), 1);
    assert!(steady[0].starts_with("Set pin 0 to "));
    assert!(steady[0].contains("high"));

    // Toggles at 0, 500 and 1000 ms
    let blinking = blinking.lines();
    assert_eq!(blinking.len(), 3);
    assert!(blinking.iter().all(|line| line.starts_with("Set pin 1 to ")));
    assert!(blinking[0].contains("high"));
    assert!(blinking[1].contains("low"));
    assert!(blinking[2].contains("high"));
}

#[tokio::test(start_paused = true)]
async fn test_gpio_pins_follow_statuses_and_are_released() {
    let root = fake_sysfs("gpio", &[17, 27]);
    let jobs = vec!["build".to_string(), "deploy".to_string()];
    let channels = open_channels_at(OutputKind::Gpio, jobs.len(), &[17, 27], &root).unwrap();
    assert_eq!(fs::read_to_string(root.join("gpio17/direction")).unwrap(), "low");

    let (mut reconciler, _tx) = build_reconciler(jobs.into_iter().zip(channels).collect());

    reconciler
        .reconcile_once(&snapshot(&[("build", "yellow"), ("deploy", "red")]))
        .await;
    assert_eq!(fs::read_to_string(root.join("gpio17/value")).unwrap(), "1");
    assert_eq!(fs::read_to_string(root.join("gpio27/value")).unwrap(), "0");

    reconciler.shutdown().await;
    assert_eq!(fs::read_to_string(root.join("gpio17/value")).unwrap(), "0");
    assert_eq!(fs::read_to_string(root.join("gpio27/value")).unwrap(), "0");
    // Each release overwrites the unexport file; the last job goes last
    assert_eq!(fs::read_to_string(root.join("unexport")).unwrap(), "27");

    let _ = fs::remove_dir_all(&root);
}
