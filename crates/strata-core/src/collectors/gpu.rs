//! GPU collectors.
//!
//! Linux queries NVIDIA devices through `nvidia-smi`; hosts without it get
//! no GPU metrics at all (never zero placeholders). macOS reads the single
//! Apple GPU from the powermetrics document; its VRAM is unified memory, so
//! no VRAM metrics exist there.

use crate::collectors::{Collector, MetricBatch, run_command};
use crate::error::Error;
use crate::sample::PlatformContext;

const MIB: f64 = 1024.0 * 1024.0;

/// One device row from
/// `nvidia-smi --query-gpu=utilization.gpu,memory.used,memory.total --format=csv,noheader,nounits`:
/// utilization percent, VRAM used MiB, VRAM total MiB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NvidiaGpu {
    pub utilization: f64,
    pub memory_used: f64,
    pub memory_total: f64,
}

pub(crate) fn parse_nvidia_smi(text: &str) -> Vec<NvidiaGpu> {
    let mut gpus = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 3 {
            continue;
        }
        let (Ok(util), Ok(used), Ok(total)) = (
            fields[0].parse::<f64>(),
            fields[1].parse::<f64>(),
            fields[2].parse::<f64>(),
        ) else {
            continue;
        };
        gpus.push(NvidiaGpu {
            utilization: util.clamp(0.0, 100.0),
            memory_used: used * MIB,
            memory_total: total * MIB,
        });
    }
    gpus
}

pub struct LinuxGpuCollector {
    /// Whether nvidia-smi answered at least once; probed lazily and cached
    /// so a host without the tool does not pay a subprocess per tick.
    available: Option<bool>,
}

impl LinuxGpuCollector {
    pub fn new() -> Self {
        Self { available: None }
    }

    fn query() -> Option<String> {
        run_command(
            "nvidia-smi",
            &[
                "--query-gpu=utilization.gpu,memory.used,memory.total",
                "--format=csv,noheader,nounits",
            ],
        )
    }
}

impl Default for LinuxGpuCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for LinuxGpuCollector {
    fn domain(&self) -> &'static str {
        "gpu"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        if self.available == Some(false) {
            return Ok(MetricBatch::new());
        }
        let Some(out) = Self::query() else {
            self.available = Some(false);
            return Ok(MetricBatch::new());
        };
        self.available = Some(true);

        let gpus = parse_nvidia_smi(&out);
        let mut batch = MetricBatch::new();
        for (i, gpu) in gpus.iter().enumerate() {
            batch.push((
                format!("gpu.nvidia.{i}.compute.utilization.percent"),
                gpu.utilization,
            ));
            if gpu.memory_total > 0.0 {
                batch.push((format!("gpu.nvidia.{i}.memory.used.bytes"), gpu.memory_used));
                batch.push((format!("gpu.nvidia.{i}.memory.total.bytes"), gpu.memory_total));
            }
        }
        if !gpus.is_empty() {
            batch.push(("gpu.total.count".into(), gpus.len() as f64));
        }
        Ok(batch)
    }
}

pub struct MacGpuCollector;

impl Collector for MacGpuCollector {
    fn domain(&self) -> &'static str {
        "gpu"
    }

    fn collect(&mut self, context: &PlatformContext) -> Result<MetricBatch, Error> {
        let PlatformContext::PowerMetrics(doc) = context else {
            return Err(Error::Parse("gpu collector expects a powermetrics document".into()));
        };
        let Some(gpu) = &doc.gpu else {
            return Ok(MetricBatch::new());
        };
        let util = (100.0 - 100.0 * gpu.idle_ratio).clamp(0.0, 100.0);
        Ok(vec![
            ("gpu.apple.0.compute.utilization.percent".into(), util),
            ("gpu.total.count".into(), 1.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nvidia_smi_rows() {
        let out = "34, 1024, 8192\n78, 4096, 8192\n";
        let gpus = parse_nvidia_smi(out);
        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].utilization, 34.0);
        assert_eq!(gpus[0].memory_used, 1024.0 * MIB);
        assert_eq!(gpus[1].memory_total, 8192.0 * MIB);
    }

    #[test]
    fn skips_malformed_rows() {
        let gpus = parse_nvidia_smi("oops\n50, 100, 200\nN/A, N/A, N/A\n");
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].utilization, 50.0);
    }

    #[test]
    fn macos_gpu_from_idle_ratio() {
        use crate::powermetrics::{GpuSample, PowerMetricsDoc};
        let doc = PowerMetricsDoc {
            gpu: Some(GpuSample { idle_ratio: 0.96 }),
            ..Default::default()
        };
        let mut collector = MacGpuCollector;
        let batch = collector
            .collect(&PlatformContext::PowerMetrics(doc))
            .unwrap();
        assert_eq!(batch[0].0, "gpu.apple.0.compute.utilization.percent");
        assert!((batch[0].1 - 4.0).abs() < 1e-9);
        assert_eq!(batch[1], ("gpu.total.count".to_string(), 1.0));
    }
}
