//! CSV output mode: one `timestamp,metric,value` row per standardized
//! metric per tick, written inline on the sampler callback.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use strata_core::{CollectorSet, Error, Platform, PollingSampler, PowerMetricsSampler, Sample};

use crate::RunConfig;

/// `timestamp,metric,value` with microsecond timestamps and no thousands
/// separators.
pub fn format_row(timestamp: f64, metric: &str, value: f64) -> String {
    format!("{timestamp:.6},{metric},{value}")
}

struct CsvWriter {
    collectors: CollectorSet,
    header_written: bool,
}

impl CsvWriter {
    /// Write one tick. Metric names are sorted so consumers see a stable
    /// column order regardless of collector emission order.
    fn write_tick(&mut self, sample: &Sample, out: &mut impl Write) -> std::io::Result<()> {
        let mut batch = self.collectors.run(&sample.context);
        batch.sort_by(|(a, _), (b, _)| a.cmp(b));

        if !self.header_written {
            writeln!(out, "timestamp,metric,value")?;
            self.header_written = true;
        }
        for (name, value) in &batch {
            writeln!(out, "{}", format_row(sample.timestamp, name, *value))?;
        }
        out.flush()
    }
}

/// Run the sampler on the current thread, streaming CSV until the pipe
/// closes or the process is interrupted.
pub fn run(platform: Platform, config: &RunConfig) -> Result<(), Error> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut writer = CsvWriter {
        collectors: CollectorSet::new(platform, config.refresh_ms),
        header_written: false,
    };
    let stdout = std::io::stdout();

    let flag = Arc::clone(&shutdown);
    let mut on_sample = move |sample: Sample| {
        let mut out = stdout.lock();
        if writer.write_tick(&sample, &mut out).is_err() {
            // Downstream closed the pipe; wind down cleanly.
            info!("stdout closed, stopping CSV output");
            flag.store(true, Ordering::Relaxed);
        }
    };

    match platform {
        Platform::MacOS => {
            PowerMetricsSampler::spawn(config.refresh_ms)?.run(&shutdown, on_sample)
        }
        Platform::Linux => {
            PollingSampler::new(config.refresh_ms).run(&shutdown, &mut on_sample);
            Ok(())
        }
    }
}
