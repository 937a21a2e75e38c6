//! Memory collectors.
//!
//! Always emits `memory.system.total.used.percent` and
//! `memory.system.total.used.bytes`; platform-specific breakdown rows
//! (`wired` on macOS, `mapped` on Linux) are added when available and
//! simply absent otherwise.

use std::collections::HashMap;

use crate::collectors::{Collector, MetricBatch, run_command};
use crate::error::Error;
use crate::sample::PlatformContext;

/// Parse `/proc/meminfo` into bytes per key.
pub(crate) fn parse_meminfo(text: &str) -> HashMap<String, f64> {
    let mut out = HashMap::new();
    for line in text.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(kb) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<f64>().ok())
        else {
            continue;
        };
        out.insert(key.trim().to_string(), kb * 1024.0);
    }
    out
}

pub struct LinuxMemoryCollector;

impl Collector for LinuxMemoryCollector {
    fn domain(&self) -> &'static str {
        "memory"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        let text = std::fs::read_to_string("/proc/meminfo")?;
        let meminfo = parse_meminfo(&text);
        let total = *meminfo
            .get("MemTotal")
            .ok_or_else(|| Error::Parse("meminfo is missing MemTotal".into()))?;
        let available = *meminfo
            .get("MemAvailable")
            .ok_or_else(|| Error::Parse("meminfo is missing MemAvailable".into()))?;
        if total <= 0.0 {
            return Err(Error::Parse("meminfo reports zero total memory".into()));
        }
        let used = total - available;

        let mut batch = vec![
            ("memory.system.total.used.percent".into(), 100.0 * used / total),
            ("memory.system.total.used.bytes".into(), used),
        ];
        if let Some(mapped) = meminfo.get("Mapped") {
            batch.push(("memory.system.mapped.bytes".into(), *mapped));
        }
        Ok(batch)
    }
}

/// Parse `vm_stat` output into (page size, pages per counter).
pub(crate) fn parse_vm_stat(text: &str) -> (f64, HashMap<String, f64>) {
    let mut page_size = 4096.0;
    let mut pages = HashMap::new();
    for line in text.lines() {
        if line.contains("page size of")
            && let Some(ps) = line
                .split("page size of")
                .nth(1)
                .and_then(|s| s.split_whitespace().next())
                .and_then(|s| s.parse::<f64>().ok())
        {
            page_size = ps;
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        // vm_stat writes counters with a trailing period.
        let cleaned = value.replace('.', "");
        if let Some(count) = cleaned
            .split_whitespace()
            .next()
            .and_then(|s| s.parse::<f64>().ok())
        {
            pages.insert(key.trim().to_string(), count);
        }
    }
    (page_size, pages)
}

pub struct MacMemoryCollector;

impl Collector for MacMemoryCollector {
    fn domain(&self) -> &'static str {
        "memory"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        let total = run_command("sysctl", &["-n", "hw.memsize"])
            .and_then(|s| s.trim().parse::<f64>().ok())
            .ok_or_else(|| Error::Parse("sysctl hw.memsize unavailable".into()))?;
        let vm = run_command("vm_stat", &[])
            .ok_or_else(|| Error::Parse("vm_stat unavailable".into()))?;
        let (page_size, pages) = parse_vm_stat(&vm);

        let bytes = |key: &str| pages.get(key).map(|p| p * page_size);
        let active = bytes("Pages active").unwrap_or(0.0);
        let wired = bytes("Pages wired down");
        let compressed = bytes("Pages occupied by compressor").unwrap_or(0.0);
        let used = active + wired.unwrap_or(0.0) + compressed;

        let mut batch = vec![
            (
                "memory.system.total.used.percent".into(),
                (100.0 * used / total).clamp(0.0, 100.0),
            ),
            ("memory.system.total.used.bytes".into(), used),
        ];
        if let Some(wired) = wired {
            batch.push(("memory.system.wired.bytes".into(), wired));
        }
        Ok(batch)
    }
}
