//! Metric collectors: raw platform context in, standardized names out.
//!
//! One collector exists per (domain, platform); [`collectors_for`] is the
//! explicit startup-time table that picks the set for the current platform.
//! Collectors are owned by the sampling thread and may keep state between
//! ticks (previous counters for rate conversion).

pub mod accel;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod power;
pub mod swap;

use std::io::Read;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::Error;
use crate::sample::{Platform, PlatformContext};

/// One tick's output: standardized name/value pairs in emission order.
pub type MetricBatch = Vec<(String, f64)>;

pub trait Collector: Send {
    /// Metric domain this collector emits (`cpu`, `memory`, ...).
    fn domain(&self) -> &'static str;

    /// Produce this tick's metrics. An error drops the domain's keys for the
    /// tick; it never aborts the loop.
    fn collect(&mut self, context: &PlatformContext) -> Result<MetricBatch, Error>;
}

/// The collector table for a platform, in layout order.
pub fn collectors_for(platform: Platform, refresh_ms: u64) -> Vec<Box<dyn Collector>> {
    match platform {
        Platform::Linux => vec![
            Box::new(cpu::LinuxCpuCollector::new()),
            Box::new(gpu::LinuxGpuCollector::new()),
            Box::new(memory::LinuxMemoryCollector),
            Box::new(swap::LinuxSwapCollector),
            Box::new(network::LinuxNetworkCollector::new(refresh_ms)),
            Box::new(disk::LinuxDiskCollector::new(refresh_ms)),
        ],
        Platform::MacOS => vec![
            Box::new(cpu::MacCpuCollector),
            Box::new(gpu::MacGpuCollector),
            Box::new(memory::MacMemoryCollector),
            Box::new(accel::MacAccelCollector::detect()),
            Box::new(swap::MacSwapCollector),
            Box::new(network::MacNetworkCollector),
            Box::new(disk::MacDiskCollector),
            Box::new(power::MacPowerCollector),
        ],
    }
}

/// Consecutive failures before a collector's problems escalate from DEBUG
/// to WARN.
const FAILURE_WARN_THRESHOLD: u32 = 3;

/// Runs the platform's collectors each tick, isolating failures.
pub struct CollectorSet {
    collectors: Vec<Box<dyn Collector>>,
    failures: Vec<u32>,
}

impl CollectorSet {
    pub fn new(platform: Platform, refresh_ms: u64) -> Self {
        Self::from_collectors(collectors_for(platform, refresh_ms))
    }

    pub fn from_collectors(collectors: Vec<Box<dyn Collector>>) -> Self {
        let failures = vec![0; collectors.len()];
        Self {
            collectors,
            failures,
        }
    }

    /// Run every collector, concatenating their batches. A failing collector
    /// contributes nothing this tick and the rest proceed.
    pub fn run(&mut self, context: &PlatformContext) -> MetricBatch {
        let mut batch = MetricBatch::new();
        for (collector, failures) in self.collectors.iter_mut().zip(self.failures.iter_mut()) {
            match collector.collect(context) {
                Ok(metrics) => {
                    *failures = 0;
                    batch.extend(metrics);
                }
                Err(e) => {
                    *failures += 1;
                    if *failures >= FAILURE_WARN_THRESHOLD {
                        warn!(
                            domain = collector.domain(),
                            failures = *failures,
                            "collector keeps failing: {e}"
                        );
                    } else {
                        debug!(domain = collector.domain(), "collector failed: {e}");
                    }
                }
            }
        }
        batch
    }
}

/// Run a short-lived command with a bounded wait, returning trimmed stdout.
/// Missing binaries, failures, timeouts, and empty output all map to `None`.
pub(crate) fn run_command(cmd: &str, args: &[&str]) -> Option<String> {
    const COMMAND_TIMEOUT: Duration = Duration::from_millis(400);

    let mut child = std::process::Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                let mut out = Vec::new();
                if let Some(mut stdout) = child.stdout.take() {
                    let _ = stdout.read_to_end(&mut out);
                }
                let s = String::from_utf8_lossy(&out).trim().to_string();
                return if s.is_empty() { None } else { Some(s) };
            }
            Ok(None) => {
                if start.elapsed() >= COMMAND_TIMEOUT {
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(_) => return None,
        }
    }
}

/// Lowercase a raw identifier into a valid metric name segment
/// (`[a-z0-9_]+`).
pub(crate) fn sanitize_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_us = false;
    for ch in raw.to_ascii_lowercase().chars() {
        let mapped = if ch.is_ascii_alphanumeric() { ch } else { '_' };
        if mapped == '_' {
            if !prev_us {
                out.push(mapped);
            }
            prev_us = true;
        } else {
            out.push(mapped);
            prev_us = false;
        }
    }
    out.trim_matches('_').to_string()
}
