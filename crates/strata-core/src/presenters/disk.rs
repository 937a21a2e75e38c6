//! Disk presenter: total read/write plus per-device rows.

use crate::format::{BYTES_PER_SEC, format_measurement, pow10_ceiling};
use crate::modes::SimpleMode;
use crate::presenters::{Presenter, Row};

pub struct DiskPresenter {
    mode: SimpleMode,
}

impl DiskPresenter {
    pub fn new(mode: SimpleMode) -> Self {
        Self { mode }
    }
}

impl Presenter for DiskPresenter {
    fn domain(&self) -> &'static str {
        "disk"
    }

    fn hotkey(&self) -> Option<char> {
        Some('d')
    }

    fn cycle(&mut self) {
        self.mode = self.mode.next();
    }

    fn cycle_back(&mut self) {
        self.mode = self.mode.prev();
    }

    fn rows(&self, names: &[String]) -> Vec<Row> {
        if self.mode == SimpleMode::Hide {
            return Vec::new();
        }
        let mut rows = Vec::new();
        for name in names {
            let parts: Vec<&str> = name.split('.').collect();
            match parts.as_slice() {
                ["disk", "total", dir, "bytes_per_sec"] => {
                    rows.push(Row::new(name.clone(), format!("disk {dir}"), 0));
                }
                ["disk", "device", device, dir, "bytes_per_sec"] => {
                    rows.push(Row::new(name.clone(), format!("{device} {dir}"), 2));
                }
                _ => {}
            }
        }
        rows
    }

    fn format(&self, _title: &str, value: f64, scale: f64) -> String {
        format_measurement(value, scale, BYTES_PER_SEC)
    }

    fn scale(&self, _title: &str, window_max: f64) -> f64 {
        pow10_ceiling(window_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_then_devices() {
        let names: Vec<String> = vec![
            "disk.total.read.bytes_per_sec".into(),
            "disk.total.write.bytes_per_sec".into(),
            "disk.device.nvme0n1.read.bytes_per_sec".into(),
            "disk.device.nvme0n1.write.bytes_per_sec".into(),
        ];
        let presenter = DiskPresenter::new(SimpleMode::Show);
        let rows = presenter.rows(&names);
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["disk read", "disk write", "nvme0n1 read", "nvme0n1 write"]
        );
    }

    #[test]
    fn hide_mode() {
        let presenter = DiskPresenter::new(SimpleMode::Hide);
        assert!(presenter
            .rows(&vec!["disk.total.read.bytes_per_sec".to_string()])
            .is_empty());
    }
}
