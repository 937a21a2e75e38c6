//! Presenters: pure transforms from stored metric names/values to
//! display-ready rows. They never touch the store or the terminal.
//!
//! Each domain presenter owns its display mode, answers which rows are
//! visible (with title and indent), formats values, and supplies the scale
//! denominator the horizon renderer divides by.

pub mod accel;
pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod power;
pub mod swap;

use crate::modes::{CpuMode, GpuMode, MemoryMode, PowerMode, SimpleMode};

/// One visible chart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Standardized metric name backing this row.
    pub metric: String,
    /// Human title drawn on the ruler line.
    pub title: String,
    /// Nesting depth in columns (cores under a cluster, devices under a
    /// total).
    pub indent: u16,
}

impl Row {
    fn new(metric: impl Into<String>, title: impl Into<String>, indent: u16) -> Self {
        Self {
            metric: metric.into(),
            title: title.into(),
            indent,
        }
    }
}

pub trait Presenter: Send {
    /// Metric domain this presenter displays (`cpu`, `memory`, ...).
    fn domain(&self) -> &'static str;

    /// Hotkey that cycles this presenter's display mode, if it has one.
    fn hotkey(&self) -> Option<char>;

    fn cycle(&mut self);
    fn cycle_back(&mut self);

    /// Visible rows for this domain's series (given in first-seen order),
    /// in display order.
    fn rows(&self, names: &[String]) -> Vec<Row>;

    /// Format a value for the ruler. `scale` is the row's current scale
    /// denominator so labels along one chart share a unit.
    fn format(&self, title: &str, value: f64, scale: f64) -> String;

    /// Scale denominator for a row given its window maximum.
    fn scale(&self, title: &str, window_max: f64) -> f64;
}

/// Initial display modes, usually taken from the command line.
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    pub cpu: CpuMode,
    pub gpu: GpuMode,
    pub memory: MemoryMode,
    pub swap: SimpleMode,
    pub network: SimpleMode,
    pub disk: SimpleMode,
    pub power: PowerMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cpu: auto_cpu_mode(),
            gpu: GpuMode::LoadOnly,
            memory: MemoryMode::All,
            swap: SimpleMode::Show,
            network: SimpleMode::Show,
            disk: SimpleMode::Show,
            power: PowerMode::Combined,
        }
    }
}

/// Per-core rows get unwieldy on big machines; default to cluster totals
/// once past 20 cores.
pub fn auto_cpu_mode() -> CpuMode {
    match std::thread::available_parallelism() {
        Ok(n) if n.get() >= 20 => CpuMode::ByCluster,
        _ => CpuMode::All,
    }
}

/// The presenter table, in vertical layout order.
pub fn presenters_for(config: DisplayConfig) -> Vec<Box<dyn Presenter>> {
    vec![
        Box::new(cpu::CpuPresenter::new(config.cpu)),
        Box::new(gpu::GpuPresenter::new(config.gpu)),
        Box::new(memory::MemoryPresenter::new(config.memory)),
        Box::new(accel::AccelPresenter),
        Box::new(swap::SwapPresenter::new(config.swap)),
        Box::new(network::NetworkPresenter::new(config.network)),
        Box::new(disk::DiskPresenter::new(config.disk)),
        Box::new(power::PowerPresenter::new(config.power)),
    ]
}
