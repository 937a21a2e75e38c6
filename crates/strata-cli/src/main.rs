//! strata — system telemetry as horizon charts in a 256-color terminal,
//! or the same metric stream as CSV / JSON-over-HTTP / Prometheus.

mod csv_out;
mod tui;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use strata_core::presenters::auto_cpu_mode;
use strata_core::{
    CpuMode, DisplayConfig, Error, GpuMode, MemoryMode, Platform, PowerMode, SimpleMode, ViewMode,
};

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "strata — horizon charts for system telemetry")]
#[command(version = strata_core::VERSION)]
struct Cli {
    /// Sampling period in milliseconds
    #[arg(long, short = 'i', default_value = "1000")]
    refresh_ms: u64,

    /// Datapoints retained per metric. Keeping this larger than the screen
    /// width pays off when the terminal is resized.
    #[arg(long, default_value = "500")]
    buffer_size: usize,

    /// Legend/values/time mode. Hotkey: "v".
    #[arg(long, default_value = "one", value_parser = ["off", "one", "all"])]
    view: String,

    /// CPU rows: all cores, cluster totals, or both. Hotkey: "c".
    /// Defaults to "all" below 20 cores, "by_cluster" otherwise.
    #[arg(long, value_parser = ["all", "by_cluster", "by_core"])]
    cpu: Option<String>,

    /// GPU rows: hidden, load, or load plus vram. Hotkey: "g".
    #[arg(long, default_value = "load_only", value_parser = ["collapsed", "load_only", "load_and_vram"])]
    gpu: String,

    /// Memory rows: percent only or full breakdown. Hotkey: "m".
    #[arg(long, default_value = "all", value_parser = ["percent", "all"])]
    memory: String,

    /// Show swap usage. Hotkey: "s".
    #[arg(long, default_value = "show", value_parser = ["show", "hide"])]
    swap: String,

    /// Show network io. Hotkey: "n".
    #[arg(long, default_value = "show", value_parser = ["show", "hide"])]
    network: String,

    /// Show disk io. Hotkey: "d".
    #[arg(long, default_value = "show", value_parser = ["show", "hide"])]
    disk: String,

    /// Power rows: combined, full breakdown, or hidden. Hotkey: "p".
    #[arg(long, default_value = "combined", value_parser = ["combined", "all", "off"])]
    power: String,

    /// Emit CSV to stdout instead of the TUI.
    /// Incompatible with --http-port and --prometheus-port.
    #[arg(long)]
    csv: bool,

    /// Serve metrics as JSON at http://<http-host>:<port>/metrics
    #[arg(long)]
    http_port: Option<u16>,

    /// Host for the HTTP endpoints
    #[arg(long, default_value = "localhost")]
    http_host: String,

    /// Serve Prometheus text at http://<http-host>:<port>/metrics
    #[arg(long)]
    prometheus_port: Option<u16>,
}

/// Validated runtime configuration.
#[derive(Debug)]
pub struct RunConfig {
    pub refresh_ms: u64,
    pub buffer_size: usize,
    pub view: ViewMode,
    pub display: DisplayConfig,
    pub csv: bool,
    pub http_host: String,
    pub http_port: Option<u16>,
    pub prometheus_port: Option<u16>,
}

impl RunConfig {
    fn from_cli(cli: &Cli) -> Result<Self, Error> {
        if cli.refresh_ms == 0 {
            return Err(Error::Config("--refresh-ms must be positive".into()));
        }
        if cli.buffer_size == 0 {
            return Err(Error::Config("--buffer-size must be positive".into()));
        }
        if cli.csv && (cli.http_port.is_some() || cli.prometheus_port.is_some()) {
            return Err(Error::Config(
                "--csv cannot be combined with --http-port or --prometheus-port".into(),
            ));
        }

        let cpu = match &cli.cpu {
            Some(raw) => raw.parse::<CpuMode>()?,
            None => auto_cpu_mode(),
        };
        Ok(Self {
            refresh_ms: cli.refresh_ms,
            buffer_size: cli.buffer_size,
            view: cli.view.parse::<ViewMode>()?,
            display: DisplayConfig {
                cpu,
                gpu: cli.gpu.parse::<GpuMode>()?,
                memory: cli.memory.parse::<MemoryMode>()?,
                swap: cli.swap.parse::<SimpleMode>()?,
                network: cli.network.parse::<SimpleMode>()?,
                disk: cli.disk.parse::<SimpleMode>()?,
                power: cli.power.parse::<PowerMode>()?,
            },
            csv: cli.csv,
            http_host: cli.http_host.clone(),
            http_port: cli.http_port,
            prometheus_port: cli.prometheus_port,
        })
    }
}

/// The renderer owns the terminal, so interactive runs log to a file;
/// headless CSV runs log to stderr.
fn init_logging(headless: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }
    let path = std::env::temp_dir().join("strata.log");
    if let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(path) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };
    init_logging(config.csv);

    let result = Platform::detect().and_then(|platform| {
        if config.csv {
            csv_out::run(platform, &config)
        } else {
            tui::run(platform, &config)
        }
    });
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("strata").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_are_valid() {
        let config = RunConfig::from_cli(&cli(&[])).unwrap();
        assert_eq!(config.refresh_ms, 1000);
        assert_eq!(config.buffer_size, 500);
        assert_eq!(config.view, ViewMode::One);
        assert!(!config.csv);
    }

    #[test]
    fn zero_refresh_is_a_config_error() {
        let err = RunConfig::from_cli(&cli(&["--refresh-ms", "0"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn zero_buffer_is_a_config_error() {
        let err = RunConfig::from_cli(&cli(&["--buffer-size", "0"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn csv_excludes_http_ports() {
        let err = RunConfig::from_cli(&cli(&["--csv", "--http-port", "8080"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err =
            RunConfig::from_cli(&cli(&["--csv", "--prometheus-port", "9100"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(RunConfig::from_cli(&cli(&["--csv"])).is_ok());
    }

    #[test]
    fn mode_flags_parse() {
        let config = RunConfig::from_cli(&cli(&[
            "--cpu",
            "by_core",
            "--gpu",
            "load_and_vram",
            "--power",
            "off",
            "--view",
            "all",
        ]))
        .unwrap();
        assert_eq!(config.display.cpu, CpuMode::ByCore);
        assert_eq!(config.display.gpu, GpuMode::LoadAndVram);
        assert_eq!(config.display.power, PowerMode::Off);
        assert_eq!(config.view, ViewMode::All);
    }
}
