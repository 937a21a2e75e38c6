//! CPU presenter: hierarchical cluster/core rows.
//!
//! Regrouping is stable: each cluster's total row precedes its cores, and
//! clusters are ordered by the minimum core id they contain (performance
//! cores have the low ids on Apple Silicon, so they come out on top).

use crate::format::format_percent;
use crate::modes::CpuMode;
use crate::presenters::{Presenter, Row};

struct Cluster {
    name: String,
    total_metric: Option<String>,
    cores: Vec<(u64, String)>,
}

impl Cluster {
    fn min_core_id(&self) -> u64 {
        self.cores.iter().map(|(id, _)| *id).min().unwrap_or(u64::MAX)
    }
}

fn display_cluster(name: &str) -> String {
    if name == "cpu" {
        return "CPU".to_string();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Group `cpu.<cluster>.<idx>.{core.<id>,total}.utilization.percent` names.
fn group_clusters(names: &[String]) -> Vec<Cluster> {
    let mut clusters: Vec<(String, Cluster)> = Vec::new();
    for name in names {
        let parts: Vec<&str> = name.split('.').collect();
        let cluster_key = match parts.as_slice() {
            ["cpu", cluster, idx, "core", _, "utilization", "percent"]
            | ["cpu", cluster, idx, "total", "utilization", "percent"] => {
                format!("{cluster}.{idx}")
            }
            _ => continue,
        };
        let pos = match clusters.iter().position(|(key, _)| *key == cluster_key) {
            Some(pos) => pos,
            None => {
                clusters.push((
                    cluster_key,
                    Cluster {
                        name: parts[1].to_string(),
                        total_metric: None,
                        cores: Vec::new(),
                    },
                ));
                clusters.len() - 1
            }
        };
        let entry = &mut clusters[pos].1;
        if parts[3] == "total" {
            entry.total_metric = Some(name.clone());
        } else if let Ok(id) = parts[4].parse::<u64>() {
            entry.cores.push((id, name.clone()));
        }
    }

    let mut clusters: Vec<Cluster> = clusters.into_iter().map(|(_, c)| c).collect();
    for cluster in &mut clusters {
        cluster.cores.sort_by_key(|(id, _)| *id);
    }
    clusters.sort_by_key(Cluster::min_core_id);
    clusters
}

pub struct CpuPresenter {
    mode: CpuMode,
}

impl CpuPresenter {
    pub fn new(mode: CpuMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CpuMode {
        self.mode
    }
}

impl Presenter for CpuPresenter {
    fn domain(&self) -> &'static str {
        "cpu"
    }

    fn hotkey(&self) -> Option<char> {
        Some('c')
    }

    fn cycle(&mut self) {
        self.mode = self.mode.next();
    }

    fn cycle_back(&mut self) {
        self.mode = self.mode.prev();
    }

    fn rows(&self, names: &[String]) -> Vec<Row> {
        let mut rows = Vec::new();
        for cluster in group_clusters(names) {
            let display = display_cluster(&cluster.name);
            if self.mode != CpuMode::All
                && let Some(metric) = &cluster.total_metric
            {
                let title = format!("[{}] {display} total CPU util %", cluster.cores.len());
                rows.push(Row::new(metric.clone(), title, 0));
            }
            if self.mode != CpuMode::ByCluster {
                for (id, metric) in &cluster.cores {
                    rows.push(Row::new(metric.clone(), format!("{display} CPU {id} util %"), 2));
                }
            }
        }
        rows
    }

    fn format(&self, _title: &str, value: f64, _scale: f64) -> String {
        format_percent(value)
    }

    fn scale(&self, _title: &str, _window_max: f64) -> f64 {
        100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cluster_names() -> Vec<String> {
        [
            "cpu.performance.0.total.utilization.percent",
            "cpu.performance.0.core.0.utilization.percent",
            "cpu.performance.0.core.1.utilization.percent",
            "cpu.efficiency.1.total.utilization.percent",
            "cpu.efficiency.1.core.2.utilization.percent",
            "cpu.efficiency.1.core.3.utilization.percent",
            "cpu.total.count",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn by_core_shows_totals_then_cores_per_cluster() {
        let presenter = CpuPresenter::new(CpuMode::ByCore);
        let rows = presenter.rows(&two_cluster_names());
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "[2] Performance total CPU util %",
                "Performance CPU 0 util %",
                "Performance CPU 1 util %",
                "[2] Efficiency total CPU util %",
                "Efficiency CPU 2 util %",
                "Efficiency CPU 3 util %",
            ]
        );
        assert_eq!(rows[0].indent, 0);
        assert_eq!(rows[1].indent, 2);
    }

    #[test]
    fn by_cluster_shows_totals_only() {
        let presenter = CpuPresenter::new(CpuMode::ByCluster);
        let rows = presenter.rows(&two_cluster_names());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.title.contains("total")));
    }

    #[test]
    fn all_shows_cores_only() {
        let presenter = CpuPresenter::new(CpuMode::All);
        let rows = presenter.rows(&two_cluster_names());
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| !r.title.contains("total")));
        assert!(rows.iter().all(|r| r.indent == 2));
    }

    #[test]
    fn clusters_order_by_minimum_core_id() {
        // Efficiency carries the low core ids here, so it must come first.
        let names: Vec<String> = [
            "cpu.performance.1.total.utilization.percent",
            "cpu.performance.1.core.4.utilization.percent",
            "cpu.efficiency.0.total.utilization.percent",
            "cpu.efficiency.0.core.0.utilization.percent",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let presenter = CpuPresenter::new(CpuMode::ByCluster);
        let rows = presenter.rows(&names);
        assert!(rows[0].title.contains("Efficiency"));
        assert!(rows[1].title.contains("Performance"));
    }

    #[test]
    fn linux_synthetic_cluster_titles() {
        let names: Vec<String> = [
            "cpu.cpu.0.total.utilization.percent",
            "cpu.cpu.0.core.0.utilization.percent",
            "cpu.cpu.0.core.1.utilization.percent",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let presenter = CpuPresenter::new(CpuMode::ByCore);
        let rows = presenter.rows(&names);
        assert_eq!(rows[0].title, "[2] CPU total CPU util %");
        assert_eq!(rows[1].title, "CPU CPU 0 util %");
    }

    #[test]
    fn toggling_twice_restores_visible_set() {
        let mut presenter = CpuPresenter::new(CpuMode::ByCluster);
        let names = two_cluster_names();
        let before = presenter.rows(&names);
        presenter.cycle();
        presenter.cycle_back();
        assert_eq!(presenter.rows(&names), before);
    }

    #[test]
    fn formats_as_percent_with_fixed_scale() {
        let presenter = CpuPresenter::new(CpuMode::All);
        assert_eq!(presenter.format("any", 65.0, 100.0), "65.0%");
        assert_eq!(presenter.scale("any", 420.0), 100.0);
    }
}
