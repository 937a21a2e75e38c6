//! Power draw collector (macOS only — the powermetrics path is the one
//! place this data exists; Linux simply has no power collector registered).

use crate::collectors::{Collector, MetricBatch};
use crate::error::Error;
use crate::sample::PlatformContext;

/// powermetrics reports milliwatts.
const MILLIWATTS: f64 = 1000.0;

pub struct MacPowerCollector;

impl Collector for MacPowerCollector {
    fn domain(&self) -> &'static str {
        "power"
    }

    fn collect(&mut self, context: &PlatformContext) -> Result<MetricBatch, Error> {
        let PlatformContext::PowerMetrics(doc) = context else {
            return Err(Error::Parse("power collector expects a powermetrics document".into()));
        };
        let p = &doc.processor;
        Ok(vec![
            (
                "power.component.total.consumption.watts".into(),
                p.combined_power / MILLIWATTS,
            ),
            (
                "power.component.cpu.consumption.watts".into(),
                p.cpu_power / MILLIWATTS,
            ),
            (
                "power.component.gpu.consumption.watts".into(),
                p.gpu_power / MILLIWATTS,
            ),
            (
                "power.component.ane.consumption.watts".into(),
                p.ane_power / MILLIWATTS,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powermetrics::PowerMetricsDoc;

    #[test]
    fn converts_milliwatts_to_watts() {
        let mut doc = PowerMetricsDoc::default();
        doc.processor.combined_power = 3650.0;
        doc.processor.cpu_power = 1250.0;
        doc.processor.gpu_power = 400.0;
        doc.processor.ane_power = 2000.0;

        let mut collector = MacPowerCollector;
        let batch = collector
            .collect(&PlatformContext::PowerMetrics(doc))
            .unwrap();
        let get = |name: &str| batch.iter().find(|(n, _)| n == name).unwrap().1;
        assert_eq!(get("power.component.total.consumption.watts"), 3.65);
        assert_eq!(get("power.component.cpu.consumption.watts"), 1.25);
        assert_eq!(get("power.component.gpu.consumption.watts"), 0.4);
        assert_eq!(get("power.component.ane.consumption.watts"), 2.0);
    }
}
