//! Network I/O collectors: per-interface rx/tx rates plus totals.

use crate::collectors::{Collector, MetricBatch, sanitize_segment};
use crate::error::Error;
use crate::rate::RateReader;
use crate::sample::PlatformContext;

/// Cumulative rx/tx byte counters for one interface.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InterfaceCounters {
    pub name: String,
    pub rx_bytes: f64,
    pub tx_bytes: f64,
}

/// Parse `/proc/net/dev`. The loopback interface is skipped; it only ever
/// charts our own chatter.
pub(crate) fn parse_net_dev(text: &str) -> Vec<InterfaceCounters> {
    let mut interfaces = Vec::new();
    for line in text.lines().skip(2) {
        let Some((name, stats)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name == "lo" {
            continue;
        }
        let fields: Vec<&str> = stats.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }
        let (Ok(rx), Ok(tx)) = (fields[0].parse::<f64>(), fields[8].parse::<f64>()) else {
            continue;
        };
        interfaces.push(InterfaceCounters {
            name: name.to_string(),
            rx_bytes: rx,
            tx_bytes: tx,
        });
    }
    interfaces
}

pub struct LinuxNetworkCollector {
    rates: RateReader,
}

impl LinuxNetworkCollector {
    pub fn new(refresh_ms: u64) -> Self {
        Self {
            rates: RateReader::new(refresh_ms),
        }
    }
}

impl Collector for LinuxNetworkCollector {
    fn domain(&self) -> &'static str {
        "network"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        let text = std::fs::read_to_string("/proc/net/dev")?;
        let interfaces = parse_net_dev(&text);

        let mut total_rx = 0.0;
        let mut total_tx = 0.0;
        let mut per_interface = MetricBatch::new();
        for iface in &interfaces {
            let rx = self
                .rates
                .next(&format!("net.{}.rx", iface.name), iface.rx_bytes);
            let tx = self
                .rates
                .next(&format!("net.{}.tx", iface.name), iface.tx_bytes);
            total_rx += rx;
            total_tx += tx;
            let segment = sanitize_segment(&iface.name);
            per_interface.push((format!("network.interface.{segment}.rx.bytes_per_sec"), rx));
            per_interface.push((format!("network.interface.{segment}.tx.bytes_per_sec"), tx));
        }

        let mut batch = vec![
            ("network.total.rx.bytes_per_sec".into(), total_rx),
            ("network.total.tx.bytes_per_sec".into(), total_tx),
        ];
        batch.extend(per_interface);
        Ok(batch)
    }
}

pub struct MacNetworkCollector;

impl Collector for MacNetworkCollector {
    fn domain(&self) -> &'static str {
        "network"
    }

    fn collect(&mut self, context: &PlatformContext) -> Result<MetricBatch, Error> {
        let PlatformContext::PowerMetrics(doc) = context else {
            return Err(Error::Parse("network collector expects a powermetrics document".into()));
        };
        let Some(network) = &doc.network else {
            return Ok(MetricBatch::new());
        };
        Ok(vec![
            ("network.total.rx.bytes_per_sec".into(), network.ibyte_rate),
            ("network.total.tx.bytes_per_sec".into(), network.obyte_rate),
        ])
    }
}
