//! Swap collectors: a single `swap.system.used.bytes` gauge.

use crate::collectors::{Collector, MetricBatch, run_command};
use crate::error::Error;
use crate::sample::PlatformContext;

pub struct LinuxSwapCollector;

impl Collector for LinuxSwapCollector {
    fn domain(&self) -> &'static str {
        "swap"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        let text = std::fs::read_to_string("/proc/meminfo")?;
        let meminfo = super::memory::parse_meminfo(&text);
        let total = *meminfo
            .get("SwapTotal")
            .ok_or_else(|| Error::Parse("meminfo is missing SwapTotal".into()))?;
        let free = *meminfo
            .get("SwapFree")
            .ok_or_else(|| Error::Parse("meminfo is missing SwapFree".into()))?;
        Ok(vec![(
            "swap.system.used.bytes".into(),
            (total - free).max(0.0),
        )])
    }
}

/// Parse a `vm.swapusage` size token like `1536.00M` into bytes.
pub(crate) fn parse_size(token: &str) -> Option<f64> {
    let token = token.trim();
    let (number, unit) = match token.char_indices().find(|(_, c)| c.is_ascii_alphabetic()) {
        Some((i, _)) => token.split_at(i),
        None => (token, ""),
    };
    let value: f64 = number.parse().ok()?;
    let factor = match unit {
        "G" => 1024.0 * 1024.0 * 1024.0,
        "M" => 1024.0 * 1024.0,
        "K" => 1024.0,
        "" => 1.0,
        _ => return None,
    };
    Some(value * factor)
}

/// Extract the used-swap figure from
/// `vm.swapusage: total = 2048.00M  used = 1536.00M  free = 512.00M ...`.
pub(crate) fn parse_swapusage(text: &str) -> Option<f64> {
    let after = text.split("used =").nth(1)?;
    parse_size(after.split_whitespace().next()?)
}

pub struct MacSwapCollector;

impl Collector for MacSwapCollector {
    fn domain(&self) -> &'static str {
        "swap"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        let out = run_command("sysctl", &["vm.swapusage"])
            .ok_or_else(|| Error::Parse("sysctl vm.swapusage unavailable".into()))?;
        let used = parse_swapusage(&out)
            .ok_or_else(|| Error::Parse(format!("unexpected vm.swapusage output: {out}")))?;
        Ok(vec![("swap.system.used.bytes".into(), used.max(0.0))])
    }
}
