//! # strata-core
//!
//! Core pipeline of the strata telemetry viewer: platform samplers produce
//! timestamped raw observations, collectors normalize them into a flat
//! dot-notation metric namespace, a ring-buffer store retains bounded
//! history per metric, and presenters turn stored samples into display-ready
//! rows for the horizon renderer.
//!
//! Data flow:
//!
//! ```text
//! sampler -> collectors -> store -> (presenter -> renderer)
//!                                |  (CSV | HTTP JSON | Prometheus)
//! ```
//!
//! One sampling worker pushes samples; readers (renderer, HTTP workers, CSV
//! writer) take shared locks and never observe a partial tick.

pub mod collectors;
pub mod error;
pub mod format;
pub mod horizon;
pub mod modes;
pub mod powermetrics;
pub mod presenters;
pub mod rate;
pub mod sample;
pub mod sampler;
pub mod store;

pub use collectors::{Collector, CollectorSet, MetricBatch};
pub use error::Error;
pub use horizon::{ColorBand, cell_index};
pub use modes::{CpuMode, GpuMode, MemoryMode, PowerMode, SimpleMode, ViewMode};
pub use powermetrics::{PowerMetricsDoc, PowerMetricsSampler};
pub use presenters::{DisplayConfig, Presenter, Row, presenters_for};
pub use rate::RateReader;
pub use sample::{Platform, PlatformContext, Sample, unix_now};
pub use sampler::PollingSampler;
pub use store::{MetricStore, SeriesWindow};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
