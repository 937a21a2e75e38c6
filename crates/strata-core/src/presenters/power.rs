//! Power presenter: combined draw with optional component breakdown.

use crate::format::{format_watts, pow10_ceiling};
use crate::modes::PowerMode;
use crate::presenters::{Presenter, Row};

const TITLES: &[(&str, &str)] = &[
    ("power.component.total.consumption.watts", "total power"),
    ("power.component.cpu.consumption.watts", "CPU power"),
    ("power.component.gpu.consumption.watts", "GPU power"),
    ("power.component.ane.consumption.watts", "ANE power"),
];

pub struct PowerPresenter {
    mode: PowerMode,
}

impl PowerPresenter {
    pub fn new(mode: PowerMode) -> Self {
        Self { mode }
    }
}

impl Presenter for PowerPresenter {
    fn domain(&self) -> &'static str {
        "power"
    }

    fn hotkey(&self) -> Option<char> {
        Some('p')
    }

    fn cycle(&mut self) {
        self.mode = self.mode.next();
    }

    fn cycle_back(&mut self) {
        self.mode = self.mode.prev();
    }

    fn rows(&self, names: &[String]) -> Vec<Row> {
        if self.mode == PowerMode::Off {
            return Vec::new();
        }
        names
            .iter()
            .filter_map(|name| {
                let title = TITLES
                    .iter()
                    .find(|&&(metric, _)| metric == name.as_str())
                    .map(|&(_, title)| title)?;
                if title == "total power" {
                    Some(Row::new(name.clone(), title, 0))
                } else if self.mode == PowerMode::All {
                    Some(Row::new(name.clone(), title, 2))
                } else {
                    None
                }
            })
            .collect()
    }

    fn format(&self, _title: &str, value: f64, _scale: f64) -> String {
        format_watts(value)
    }

    fn scale(&self, _title: &str, window_max: f64) -> f64 {
        pow10_ceiling(window_max)
    }
}
