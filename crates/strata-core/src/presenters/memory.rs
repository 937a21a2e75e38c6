//! Memory presenter: percent headline with optional byte breakdown.

use crate::format::{BYTES, format_measurement, format_percent, pow10_ceiling};
use crate::modes::MemoryMode;
use crate::presenters::{Presenter, Row};

const TITLES: &[(&str, &str)] = &[
    ("memory.system.total.used.percent", "RAM used %"),
    ("memory.system.total.used.bytes", "RAM used"),
    ("memory.system.wired.bytes", "RAM wired"),
    ("memory.system.mapped.bytes", "RAM mapped"),
];

pub struct MemoryPresenter {
    mode: MemoryMode,
}

impl MemoryPresenter {
    pub fn new(mode: MemoryMode) -> Self {
        Self { mode }
    }
}

impl Presenter for MemoryPresenter {
    fn domain(&self) -> &'static str {
        "memory"
    }

    fn hotkey(&self) -> Option<char> {
        Some('m')
    }

    fn cycle(&mut self) {
        self.mode = self.mode.next();
    }

    fn cycle_back(&mut self) {
        self.mode = self.mode.prev();
    }

    fn rows(&self, names: &[String]) -> Vec<Row> {
        names
            .iter()
            .filter_map(|name| {
                let title = TITLES
                    .iter()
                    .find(|&&(metric, _)| metric == name.as_str())
                    .map(|&(_, title)| title)?;
                if title == "RAM used %" {
                    Some(Row::new(name.clone(), title, 0))
                } else if self.mode == MemoryMode::All {
                    Some(Row::new(name.clone(), title, 2))
                } else {
                    None
                }
            })
            .collect()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            "memory.system.total.used.percent".into(),
            "memory.system.total.used.bytes".into(),
            "memory.system.wired.bytes".into(),
        ]
    }

    #[test]
    fn percent_mode_shows_headline_only() {
        let presenter = MemoryPresenter::new(MemoryMode::Percent);
        let rows = presenter.rows(&names());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "RAM used %");
    }

    #[test]
    fn all_mode_adds_indented_byte_rows() {
        let presenter = MemoryPresenter::new(MemoryMode::All);
        let rows = presenter.rows(&names());
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["RAM used %", "RAM used", "RAM wired"]);
        assert_eq!(rows[0].indent, 0);
        assert_eq!(rows[1].indent, 2);
    }

    #[test]
    fn unknown_memory_names_are_ignored() {
        let presenter = MemoryPresenter::new(MemoryMode::All);
        let rows = presenter.rows(&vec!["memory.system.exotic.bytes".to_string()]);
        assert!(rows.is_empty());
    }

    #[test]
    fn formats_by_row_kind() {
        let presenter = MemoryPresenter::new(MemoryMode::All);
        assert_eq!(presenter.format("RAM used %", 78.5, 100.0), "78.5%");
        assert_eq!(presenter.format("RAM used", 4.2e9, 1e10), "4.2GB");
    }
}
