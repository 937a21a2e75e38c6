//! Error taxonomy for the telemetry pipeline.
//!
//! Kinds, not call sites: configuration problems fail fast with exit code 2,
//! platform/sampler problems fail fast with exit code 1, and everything
//! transient is handled (and logged) where it occurs without surfacing here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Mutually exclusive flags, out-of-range values, missing required values.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unsupported OS, or a required privileged tool is absent.
    #[error("platform unavailable: {0}")]
    PlatformUnavailable(String),

    /// The sampler subprocess terminated unexpectedly.
    #[error("sampler exited: {0}")]
    SamplerExited(String),

    /// A raw document could not be parsed into the typed context.
    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for a fatal error: 2 for configuration problems,
    /// 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_with_2() {
        assert_eq!(Error::Config("bad".into()).exit_code(), 2);
    }

    #[test]
    fn fatal_errors_exit_with_1() {
        assert_eq!(Error::SamplerExited("gone".into()).exit_code(), 1);
        assert_eq!(Error::PlatformUnavailable("plan9".into()).exit_code(), 1);
    }
}
