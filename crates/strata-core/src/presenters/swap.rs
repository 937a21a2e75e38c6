//! Swap presenter: one absolute-bytes row, show/hide.

use crate::format::{BYTES, format_measurement, pow10_ceiling};
use crate::modes::SimpleMode;
use crate::presenters::{Presenter, Row};

pub struct SwapPresenter {
    mode: SimpleMode,
}

impl SwapPresenter {
    pub fn new(mode: SimpleMode) -> Self {
        Self { mode }
    }
}

impl Presenter for SwapPresenter {
    fn domain(&self) -> &'static str {
        "swap"
    }

    fn hotkey(&self) -> Option<char> {
        Some('s')
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
        names
            .iter()
            .filter(|name| *name == "swap.system.used.bytes")
            .map(|name| Row::new(name.clone(), "swap used", 0))
            .collect()
    }

    fn format(&self, _title: &str, value: f64, scale: f64) -> String {
        format_measurement(value, scale, BYTES)
    }

    fn scale(&self, _title: &str, window_max: f64) -> f64 {
        pow10_ceiling(window_max)
    }
}
