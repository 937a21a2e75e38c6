//! CPU utilization collectors.
//!
//! Names: `cpu.<cluster>.<idx>.core.<id>.utilization.percent` per core,
//! `cpu.<cluster>.<idx>.total.utilization.percent` per cluster, and
//! `cpu.total.count`. Linux has a single synthetic `cpu` cluster; macOS
//! reports real clusters (performance/efficiency) via powermetrics.

use crate::collectors::{Collector, MetricBatch, sanitize_segment};
use crate::error::Error;
use crate::sample::PlatformContext;

/// Busy/total jiffy counters for one core, from one `/proc/stat` reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CpuTicks {
    pub busy: u64,
    pub total: u64,
}

/// Parse the per-core `cpuN` lines of `/proc/stat`.
///
/// Fields: user nice system idle iowait irq softirq steal (guest times are
/// already folded into user/nice). Idle time is idle + iowait.
pub(crate) fn parse_proc_stat(text: &str) -> Vec<CpuTicks> {
    let mut cores = Vec::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else { continue };
        if !label.starts_with("cpu") || label == "cpu" {
            continue;
        }
        let ticks: Vec<u64> = fields.take(8).filter_map(|f| f.parse().ok()).collect();
        if ticks.len() < 8 {
            continue;
        }
        let total: u64 = ticks.iter().sum();
        let idle = ticks[3] + ticks[4];
        cores.push(CpuTicks {
            busy: total - idle,
            total,
        });
    }
    cores
}

/// Utilization percentages from two consecutive readings.
pub(crate) fn utilization(prev: &[CpuTicks], curr: &[CpuTicks]) -> Vec<f64> {
    curr.iter()
        .enumerate()
        .map(|(i, c)| match prev.get(i) {
            Some(p) if c.total > p.total => {
                let d_busy = c.busy.saturating_sub(p.busy) as f64;
                let d_total = (c.total - p.total) as f64;
                (100.0 * d_busy / d_total).clamp(0.0, 100.0)
            }
            _ => 0.0,
        })
        .collect()
}

pub struct LinuxCpuCollector {
    prev: Vec<CpuTicks>,
}

impl LinuxCpuCollector {
    pub fn new() -> Self {
        Self { prev: Vec::new() }
    }
}

impl Default for LinuxCpuCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for LinuxCpuCollector {
    fn domain(&self) -> &'static str {
        "cpu"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        let text = std::fs::read_to_string("/proc/stat")?;
        let curr = parse_proc_stat(&text);
        if curr.is_empty() {
            return Err(Error::Parse("/proc/stat has no cpu lines".into()));
        }
        let utils = utilization(&self.prev, &curr);
        self.prev = curr;

        let mut batch = MetricBatch::new();
        batch.push((
            "cpu.cpu.0.total.utilization.percent".into(),
            utils.iter().sum::<f64>() / utils.len() as f64,
        ));
        for (i, util) in utils.iter().enumerate() {
            batch.push((format!("cpu.cpu.0.core.{i}.utilization.percent"), *util));
        }
        batch.push(("cpu.total.count".into(), utils.len() as f64));
        Ok(batch)
    }
}

pub struct MacCpuCollector;

impl Collector for MacCpuCollector {
    fn domain(&self) -> &'static str {
        "cpu"
    }

    fn collect(&mut self, context: &PlatformContext) -> Result<MetricBatch, Error> {
        let PlatformContext::PowerMetrics(doc) = context else {
            return Err(Error::Parse("cpu collector expects a powermetrics document".into()));
        };

        let mut batch = MetricBatch::new();
        let mut total_cores = 0usize;
        for (idx, cluster) in doc.processor.clusters.iter().enumerate() {
            if cluster.cpus.is_empty() {
                continue;
            }
            let name = sanitize_segment(&cluster.name);
            let mut cluster_sum = 0.0;
            let mut core_metrics = Vec::with_capacity(cluster.cpus.len());
            for cpu in &cluster.cpus {
                let util = (100.0 - 100.0 * cpu.idle_ratio).clamp(0.0, 100.0);
                cluster_sum += util;
                core_metrics.push((
                    format!("cpu.{name}.{idx}.core.{}.utilization.percent", cpu.cpu),
                    util,
                ));
            }
            batch.push((
                format!("cpu.{name}.{idx}.total.utilization.percent"),
                cluster_sum / cluster.cpus.len() as f64,
            ));
            batch.extend(core_metrics);
            total_cores += cluster.cpus.len();
        }
        batch.push(("cpu.total.count".into(), total_cores as f64));
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powermetrics::{ClusterSample, CpuSample, PowerMetricsDoc};

    const STAT: &str = "\
cpu  100 0 100 800 0 0 0 0 0 0
cpu0 50 0 50 400 0 0 0 0 0 0
cpu1 50 0 50 400 0 0 0 0 0 0
intr 12345
";

    #[test]
    fn parses_per_core_lines_only() {
        let cores = parse_proc_stat(STAT);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0], CpuTicks { busy: 100, total: 500 });
    }

    #[test]
    fn utilization_from_deltas() {
        let prev = vec![CpuTicks { busy: 100, total: 500 }];
        let curr = vec![CpuTicks { busy: 150, total: 600 }];
        assert_eq!(utilization(&prev, &curr), vec![50.0]);
    }

    #[test]
    fn utilization_is_zero_without_history() {
        let curr = vec![CpuTicks { busy: 100, total: 500 }];
        assert_eq!(utilization(&[], &curr), vec![0.0]);
    }

    #[test]
    fn utilization_survives_stalled_counters() {
        let same = vec![CpuTicks { busy: 100, total: 500 }];
        assert_eq!(utilization(&same, &same), vec![0.0]);
    }

    fn doc_with_clusters() -> PowerMetricsDoc {
        let mut doc = PowerMetricsDoc::default();
        doc.processor.clusters = vec![
            ClusterSample {
                name: "Performance".into(),
                cpus: vec![
                    CpuSample { cpu: 0, idle_ratio: 0.3 },
                    CpuSample { cpu: 1, idle_ratio: 0.4 },
                ],
            },
            ClusterSample {
                name: "Efficiency".into(),
                cpus: vec![
                    CpuSample { cpu: 2, idle_ratio: 0.8 },
                    CpuSample { cpu: 3, idle_ratio: 0.9 },
                ],
            },
        ];
        doc
    }

    #[test]
    fn macos_emits_cluster_totals_and_cores() {
        let mut collector = MacCpuCollector;
        let ctx = PlatformContext::PowerMetrics(doc_with_clusters());
        let batch = collector.collect(&ctx).unwrap();
        let names: Vec<&str> = batch.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cpu.performance.0.total.utilization.percent",
                "cpu.performance.0.core.0.utilization.percent",
                "cpu.performance.0.core.1.utilization.percent",
                "cpu.efficiency.1.total.utilization.percent",
                "cpu.efficiency.1.core.2.utilization.percent",
                "cpu.efficiency.1.core.3.utilization.percent",
                "cpu.total.count",
            ]
        );
        let get = |name: &str| batch.iter().find(|(n, _)| n == name).unwrap().1;
        assert!((get("cpu.performance.0.total.utilization.percent") - 65.0).abs() < 1e-9);
        assert!((get("cpu.performance.0.core.0.utilization.percent") - 70.0).abs() < 1e-9);
        assert!((get("cpu.efficiency.1.total.utilization.percent") - 15.0).abs() < 1e-9);
        assert_eq!(get("cpu.total.count"), 4.0);
    }

    #[test]
    fn macos_clamps_out_of_range_ratios() {
        let mut doc = PowerMetricsDoc::default();
        doc.processor.clusters = vec![ClusterSample {
            name: "E".into(),
            cpus: vec![CpuSample { cpu: 0, idle_ratio: -0.1 }],
        }];
        let mut collector = MacCpuCollector;
        let batch = collector
            .collect(&PlatformContext::PowerMetrics(doc))
            .unwrap();
        let core = batch
            .iter()
            .find(|(n, _)| n.contains(".core."))
            .unwrap()
            .1;
        assert_eq!(core, 100.0);
    }
}
