//! Network presenter: total rx/tx plus per-interface rows.

use crate::format::{BYTES_PER_SEC, format_measurement, pow10_ceiling};
use crate::modes::SimpleMode;
use crate::presenters::{Presenter, Row};

pub struct NetworkPresenter {
    mode: SimpleMode,
}

impl NetworkPresenter {
    pub fn new(mode: SimpleMode) -> Self {
        Self { mode }
    }
}

impl Presenter for NetworkPresenter {
    fn domain(&self) -> &'static str {
        "network"
    }

    fn hotkey(&self) -> Option<char> {
        Some('n')
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
                ["network", "total", dir, "bytes_per_sec"] => {
                    rows.push(Row::new(name.clone(), format!("network {dir}"), 0));
                }
                ["network", "interface", iface, dir, "bytes_per_sec"] => {
                    rows.push(Row::new(name.clone(), format!("{iface} {dir}"), 2));
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
