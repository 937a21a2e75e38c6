//! Apple Neural Engine utilization, approximated from instantaneous power.
//!
//! The ANE exposes no utilization counter; power draw against the chip's
//! ceiling is the established proxy. The ceiling table is measured, not
//! published: every generation so far lands near the same figure, with
//! Ultra parts carrying two ANE blocks.

use tracing::warn;

use crate::collectors::{Collector, MetricBatch, run_command};
use crate::error::Error;
use crate::sample::PlatformContext;

/// Fallback ceiling for chips not in the table (the M2 figure).
const DEFAULT_MAX_WATTS: f64 = 15.5;

/// Peak ANE watts per chip family.
const MAX_WATTS_TABLE: &[(&str, f64)] = &[("M1", 13.0), ("M2", 15.5), ("M3", 15.5)];

/// Ceiling for a `machdep.cpu.brand_string` value, None when the model is
/// not in the table.
pub(crate) fn max_watts_for_brand(brand: &str) -> Option<f64> {
    for (family, watts) in MAX_WATTS_TABLE {
        if brand.contains(family) {
            let watts = if brand.to_lowercase().contains("ultra") {
                watts * 2.0
            } else {
                *watts
            };
            return Some(watts);
        }
    }
    None
}

pub struct MacAccelCollector {
    max_watts: f64,
}

impl MacAccelCollector {
    /// Resolve the ceiling from the machine model, warning once when the
    /// model is unknown.
    pub fn detect() -> Self {
        let brand = run_command("sysctl", &["-n", "machdep.cpu.brand_string"]);
        let max_watts = match brand.as_deref().and_then(max_watts_for_brand) {
            Some(watts) => watts,
            None => {
                warn!(
                    brand = brand.as_deref().unwrap_or("unknown"),
                    "no ANE power ceiling for this chip, assuming {DEFAULT_MAX_WATTS} W"
                );
                DEFAULT_MAX_WATTS
            }
        };
        Self { max_watts }
    }

    pub fn with_max_watts(max_watts: f64) -> Self {
        Self { max_watts }
    }
}

impl Collector for MacAccelCollector {
    fn domain(&self) -> &'static str {
        "accel"
    }

    fn collect(&mut self, context: &PlatformContext) -> Result<MetricBatch, Error> {
        let PlatformContext::PowerMetrics(doc) = context else {
            return Err(Error::Parse("accel collector expects a powermetrics document".into()));
        };
        let watts = doc.processor.ane_power / 1000.0;
        let util = (100.0 * watts / self.max_watts).clamp(0.0, 100.0);
        Ok(vec![("accel.ane.utilization.percent".into(), util)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powermetrics::PowerMetricsDoc;

    #[test]
    fn brand_table() {
        assert_eq!(max_watts_for_brand("Apple M1 Pro"), Some(13.0));
        assert_eq!(max_watts_for_brand("Apple M2"), Some(15.5));
        assert_eq!(max_watts_for_brand("Apple M1 Ultra"), Some(26.0));
        assert_eq!(max_watts_for_brand("Apple M3 Max"), Some(15.5));
        assert_eq!(max_watts_for_brand("Intel(R) Core(TM) i7"), None);
    }

    #[test]
    fn two_watts_on_an_eight_watt_chip_is_25_percent() {
        let mut doc = PowerMetricsDoc::default();
        doc.processor.ane_power = 2000.0; // mW
        let mut collector = MacAccelCollector::with_max_watts(8.0);
        let batch = collector
            .collect(&PlatformContext::PowerMetrics(doc))
            .unwrap();
        assert_eq!(batch, vec![("accel.ane.utilization.percent".to_string(), 25.0)]);
    }

    #[test]
    fn utilization_is_clamped_to_100() {
        let mut doc = PowerMetricsDoc::default();
        doc.processor.ane_power = 50_000.0;
        let mut collector = MacAccelCollector::with_max_watts(8.0);
        let batch = collector
            .collect(&PlatformContext::PowerMetrics(doc))
            .unwrap();
        assert_eq!(batch[0].1, 100.0);
    }
}
