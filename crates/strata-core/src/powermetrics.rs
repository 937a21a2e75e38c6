//! The macOS powermetrics sampler and its typed document model.
//!
//! `powermetrics` writes a stream of self-delimited XML property lists to
//! stdout, injecting a NUL byte right before each measurement event. We
//! frame on the `</plist>` terminator instead of the NUL, because waiting
//! for the NUL would delay every sample by one full period.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tracing::warn;

use crate::error::Error;
use crate::sample::{PlatformContext, Sample, unix_now};

/// Samplers requested from powermetrics.
const POWERMETRICS_SAMPLERS: &str = "cpu_power,gpu_power,ane_power,network,disk";

/// One parsed powermetrics measurement document.
///
/// Only the sections the collectors consume are modeled; powermetrics emits
/// plenty more and serde skips it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowerMetricsDoc {
    #[serde(default)]
    pub processor: ProcessorSample,
    #[serde(default)]
    pub gpu: Option<GpuSample>,
    #[serde(default)]
    pub network: Option<NetworkSample>,
    #[serde(default)]
    pub disk: Option<DiskSample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessorSample {
    #[serde(default)]
    pub clusters: Vec<ClusterSample>,
    /// Milliwatts, as reported on the wire.
    #[serde(default)]
    pub cpu_power: f64,
    #[serde(default)]
    pub gpu_power: f64,
    #[serde(default)]
    pub ane_power: f64,
    #[serde(default)]
    pub combined_power: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSample {
    pub name: String,
    #[serde(default)]
    pub cpus: Vec<CpuSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CpuSample {
    pub cpu: u32,
    #[serde(default)]
    pub idle_ratio: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GpuSample {
    #[serde(default)]
    pub idle_ratio: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSample {
    #[serde(default)]
    pub ibyte_rate: f64,
    #[serde(default)]
    pub obyte_rate: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiskSample {
    #[serde(default)]
    pub rbytes_per_s: f64,
    #[serde(default)]
    pub wbytes_per_s: f64,
}

/// Strip the NUL bytes powermetrics injects around measurement events.
fn trim_nuls(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| b != 0).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Parse one accumulated powermetrics document.
pub fn parse_document(bytes: &[u8]) -> Result<PowerMetricsDoc, Error> {
    plist::from_bytes(trim_nuls(bytes)).map_err(|e| Error::Parse(format!("powermetrics plist: {e}")))
}

/// Stop the child politely first: sudo relays SIGTERM to powermetrics, so
/// the whole process tree winds down and the pipe reaches EOF. SIGKILL is
/// the fallback (sudo cannot forward it, so it alone would orphan the
/// grandchild).
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGTERM) };
        for _ in 0..10 {
            if let Ok(Some(_)) = child.try_wait() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Handle for unblocking the sampler thread from outside: stopping the
/// child closes its stdout, which wakes the blocked reader.
#[derive(Clone)]
pub struct SamplerHandle {
    child: Arc<Mutex<Child>>,
}

impl SamplerHandle {
    pub fn kill(&self) {
        if let Ok(mut child) = self.child.lock() {
            terminate(&mut child);
        }
    }
}

/// Subprocess-driven sampler: owns the privileged powermetrics child and
/// turns its stdout stream into [`Sample`]s.
pub struct PowerMetricsSampler {
    child: Arc<Mutex<Child>>,
    stdout: BufReader<ChildStdout>,
    first_line: Vec<u8>,
}

impl PowerMetricsSampler {
    /// Spawn powermetrics at the given period.
    ///
    /// Reads the first output line synchronously so the user can answer the
    /// sudo prompt before the terminal is switched to raw mode.
    pub fn spawn(interval_ms: u64) -> Result<Self, Error> {
        let mut child = Command::new("sudo")
            .args(["powermetrics", "-f", "plist", "-i"])
            .arg(interval_ms.to_string())
            .args(["-s", POWERMETRICS_SAMPLERS])
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::PlatformUnavailable(format!("cannot spawn powermetrics: {e}"))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::SamplerExited("powermetrics has no stdout".into()))?;
        let mut stdout = BufReader::new(stdout);

        let mut first_line = Vec::new();
        stdout.read_until(b'\n', &mut first_line)?;
        if first_line.is_empty() {
            terminate(&mut child);
            return Err(Error::SamplerExited(
                "powermetrics produced no output (denied sudo?)".into(),
            ));
        }

        Ok(Self {
            child: Arc::new(Mutex::new(child)),
            stdout,
            first_line,
        })
    }

    pub fn handle(&self) -> SamplerHandle {
        SamplerHandle {
            child: Arc::clone(&self.child),
        }
    }

    /// Read documents until shutdown is requested or the child dies.
    ///
    /// A document that fails to parse is skipped with a warning; an exiting
    /// child is fatal. The callback runs under no lock.
    pub fn run(
        mut self,
        shutdown: &AtomicBool,
        mut on_sample: impl FnMut(Sample),
    ) -> Result<(), Error> {
        let mut buf = std::mem::take(&mut self.first_line);
        let mut line = Vec::new();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(());
            }
            line.clear();
            let n = self.stdout.read_until(b'\n', &mut line)?;
            if n == 0 {
                if shutdown.load(Ordering::Relaxed) {
                    return Ok(());
                }
                return Err(Error::SamplerExited(
                    "powermetrics terminated unexpectedly".into(),
                ));
            }
            buf.extend_from_slice(&line);
            if line == b"</plist>\n" {
                match parse_document(&buf) {
                    Ok(doc) => on_sample(Sample {
                        timestamp: unix_now(),
                        context: PlatformContext::PowerMetrics(doc),
                    }),
                    Err(e) => warn!("skipping unparseable powermetrics document: {e}"),
                }
                buf.clear();
            }
        }
    }
}

impl Drop for PowerMetricsSampler {
    fn drop(&mut self) {
        // The child must not outlive us on any exit path.
        if let Ok(mut child) = self.child.lock() {
            terminate(&mut child);
        }
    }
}
