//! Accelerator (ANE) presenter. Single capped row, no display mode.

use crate::format::format_percent;
use crate::presenters::{Presenter, Row};

pub struct AccelPresenter;

impl Presenter for AccelPresenter {
    fn domain(&self) -> &'static str {
        "accel"
    }

    fn hotkey(&self) -> Option<char> {
        None
    }

    fn cycle(&mut self) {}
    fn cycle_back(&mut self) {}

    fn rows(&self, names: &[String]) -> Vec<Row> {
        names
            .iter()
            .filter(|name| *name == "accel.ane.utilization.percent")
            .map(|name| Row::new(name.clone(), "ANE util %", 0))
            .collect()
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

    #[test]
    fn single_row_when_present() {
        let presenter = AccelPresenter;
        let rows = presenter.rows(&vec!["accel.ane.utilization.percent".to_string()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "ANE util %");
        assert!(presenter.rows(&Vec::new()).is_empty());
    }
}
