//! Samples and platform context.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Error;
use crate::powermetrics::PowerMetricsDoc;

/// Host platform a sampler/collector set is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOS,
}

impl Platform {
    /// Detect the current platform, failing on anything unsupported.
    pub fn detect() -> Result<Self, Error> {
        match std::env::consts::OS {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::MacOS),
            other => Err(Error::PlatformUnavailable(format!(
                "{other} is not supported"
            ))),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOS => write!(f, "macos"),
        }
    }
}

/// Raw observation handed from the sampler to the collector set.
///
/// On macOS this is a parsed powermetrics document; on Linux it is a bare
/// marker and collectors read live OS files themselves.
#[derive(Debug, Clone)]
pub enum PlatformContext {
    PowerMetrics(PowerMetricsDoc),
    Polling { timestamp: f64 },
}

/// One sampler tick.
#[derive(Debug, Clone)]
pub struct Sample {
    /// UNIX seconds with sub-second precision.
    pub timestamp: f64,
    pub context: PlatformContext,
}

/// Current UNIX time in seconds, microsecond resolution.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_now_is_positive_and_monotonic_enough() {
        let a = unix_now();
        let b = unix_now();
        assert!(a > 1_500_000_000.0);
        assert!(b >= a);
    }

    #[test]
    fn platform_display() {
        assert_eq!(Platform::Linux.to_string(), "linux");
        assert_eq!(Platform::MacOS.to_string(), "macos");
    }
}
