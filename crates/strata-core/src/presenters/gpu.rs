//! GPU presenter: per-device load and VRAM rows.

use crate::format::{BYTES, format_measurement, format_percent, pow10_ceiling};
use crate::modes::GpuMode;
use crate::presenters::{Presenter, Row};

struct Device {
    vendor: String,
    idx: u64,
    util_metric: Option<String>,
    vram_metric: Option<String>,
}

fn group_devices(names: &[String]) -> Vec<Device> {
    let mut devices: Vec<Device> = Vec::new();
    for name in names {
        let parts: Vec<&str> = name.split('.').collect();
        let (vendor, idx, kind) = match parts.as_slice() {
            ["gpu", vendor, idx, "compute", "utilization", "percent"] => (vendor, idx, "util"),
            ["gpu", vendor, idx, "memory", "used", "bytes"] => (vendor, idx, "vram"),
            _ => continue,
        };
        let Ok(idx) = idx.parse::<u64>() else { continue };
        let pos = match devices
            .iter()
            .position(|d| d.vendor == *vendor && d.idx == idx)
        {
            Some(pos) => pos,
            None => {
                devices.push(Device {
                    vendor: vendor.to_string(),
                    idx,
                    util_metric: None,
                    vram_metric: None,
                });
                devices.len() - 1
            }
        };
        match kind {
            "util" => devices[pos].util_metric = Some(name.clone()),
            _ => devices[pos].vram_metric = Some(name.clone()),
        }
    }
    devices.sort_by(|a, b| a.vendor.cmp(&b.vendor).then(a.idx.cmp(&b.idx)));
    devices
}

pub struct GpuPresenter {
    mode: GpuMode,
}

impl GpuPresenter {
    pub fn new(mode: GpuMode) -> Self {
        Self { mode }
    }
}

impl Presenter for GpuPresenter {
    fn domain(&self) -> &'static str {
        "gpu"
    }

    fn hotkey(&self) -> Option<char> {
        Some('g')
    }

    fn cycle(&mut self) {
        self.mode = self.mode.next();
    }

    fn cycle_back(&mut self) {
        self.mode = self.mode.prev();
    }

    fn rows(&self, names: &[String]) -> Vec<Row> {
        if self.mode == GpuMode::Collapsed {
            return Vec::new();
        }
        let devices = group_devices(names);
        let indent = if devices.len() > 1 { 2 } else { 0 };
        let mut rows = Vec::new();
        for device in &devices {
            let label = if device.vendor == "apple" && devices.len() == 1 {
                "GPU".to_string()
            } else {
                format!("{} GPU {}", device.vendor.to_uppercase(), device.idx)
            };
            if let Some(metric) = &device.util_metric {
                rows.push(Row::new(metric.clone(), format!("{label} util %"), indent));
            }
            if self.mode == GpuMode::LoadAndVram
                && let Some(metric) = &device.vram_metric
            {
                rows.push(Row::new(metric.clone(), format!("{label} vram used"), indent));
            }
        }
        rows
    }

    fn format(&self, title: &str, value: f64, scale: f64) -> String {
        if title.ends_with('%') {
            format_percent(value)
        } else {
            format_measurement(value, scale, BYTES)
        }
    }

    fn scale(&self, title: &str, window_max: f64) -> f64 {
        if title.ends_with('%') {
            100.0
        } else {
            pow10_ceiling(window_max)
        }
    }
}
