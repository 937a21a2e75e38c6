//! Disk I/O collectors.
//!
//! Linux tracks cumulative sector counters per physical device from
//! `/proc/diskstats` and converts them to rates; macOS gets rates directly
//! from powermetrics, so only the totals exist there.

use crate::collectors::{Collector, MetricBatch};
use crate::error::Error;
use crate::rate::RateReader;
use crate::sample::PlatformContext;

const SECTOR_SIZE: f64 = 512.0;

/// Cumulative read/write bytes for one device.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DiskCounters {
    pub name: String,
    pub read_bytes: f64,
    pub write_bytes: f64,
}

/// Whole-disk device names worth charting: sdX, vdX, nvmeXnY, mmcblkX.
/// Partitions, loop devices, and ramdisks are skipped.
pub(crate) fn is_physical_device(name: &str) -> bool {
    let letters_then_digits = |prefix: &str| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_lowercase()))
    };
    if letters_then_digits("sd") || letters_then_digits("vd") {
        return true;
    }
    if let Some(rest) = name.strip_prefix("nvme") {
        // nvme0n1 is a namespace (whole disk); nvme0n1p1 is a partition.
        return rest.chars().all(|c| c.is_ascii_digit() || c == 'n') && rest.contains('n');
    }
    if let Some(rest) = name.strip_prefix("mmcblk") {
        return rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty();
    }
    false
}

/// Parse `/proc/diskstats`: field 3 is the device name, fields 6 and 10 are
/// sectors read/written.
pub(crate) fn parse_diskstats(text: &str) -> Vec<DiskCounters> {
    let mut devices = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let name = fields[2];
        if !is_physical_device(name) {
            continue;
        }
        let (Ok(sectors_read), Ok(sectors_written)) =
            (fields[5].parse::<f64>(), fields[9].parse::<f64>())
        else {
            continue;
        };
        devices.push(DiskCounters {
            name: name.to_string(),
            read_bytes: sectors_read * SECTOR_SIZE,
            write_bytes: sectors_written * SECTOR_SIZE,
        });
    }
    devices
}

pub struct LinuxDiskCollector {
    rates: RateReader,
}

impl LinuxDiskCollector {
    pub fn new(refresh_ms: u64) -> Self {
        Self {
            rates: RateReader::new(refresh_ms),
        }
    }
}

impl Collector for LinuxDiskCollector {
    fn domain(&self) -> &'static str {
        "disk"
    }

    fn collect(&mut self, _context: &PlatformContext) -> Result<MetricBatch, Error> {
        let text = std::fs::read_to_string("/proc/diskstats")?;
        let devices = parse_diskstats(&text);

        let mut batch = MetricBatch::new();
        let mut total_read = 0.0;
        let mut total_write = 0.0;
        let mut device_rows = MetricBatch::new();
        for dev in &devices {
            let read = self
                .rates
                .next(&format!("disk.{}.read", dev.name), dev.read_bytes);
            let write = self
                .rates
                .next(&format!("disk.{}.write", dev.name), dev.write_bytes);
            total_read += read;
            total_write += write;
            device_rows.push((format!("disk.device.{}.read.bytes_per_sec", dev.name), read));
            device_rows.push((
                format!("disk.device.{}.write.bytes_per_sec", dev.name),
                write,
            ));
        }
        batch.push(("disk.total.read.bytes_per_sec".into(), total_read));
        batch.push(("disk.total.write.bytes_per_sec".into(), total_write));
        batch.extend(device_rows);
        Ok(batch)
    }
}

pub struct MacDiskCollector;

impl Collector for MacDiskCollector {
    fn domain(&self) -> &'static str {
        "disk"
    }

    fn collect(&mut self, context: &PlatformContext) -> Result<MetricBatch, Error> {
        let PlatformContext::PowerMetrics(doc) = context else {
            return Err(Error::Parse("disk collector expects a powermetrics document".into()));
        };
        let Some(disk) = &doc.disk else {
            return Ok(MetricBatch::new());
        };
        Ok(vec![
            ("disk.total.read.bytes_per_sec".into(), disk.rbytes_per_s),
            ("disk.total.write.bytes_per_sec".into(), disk.wbytes_per_s),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_filter() {
        assert!(is_physical_device("sda"));
        assert!(is_physical_device("vdb"));
        assert!(is_physical_device("nvme0n1"));
        assert!(is_physical_device("mmcblk0"));

        assert!(!is_physical_device("sda1"));
        assert!(!is_physical_device("nvme0n1p2"));
        assert!(!is_physical_device("loop0"));
        assert!(!is_physical_device("ram0"));
        assert!(!is_physical_device("dm-0"));
        assert!(!is_physical_device("sd"));
    }

    const DISKSTATS: &str = "\
   8       0 sda 1000 0 2048 500 2000 0 4096 800 0 600 1300
   8       1 sda1 900 0 1800 400 1900 0 4000 700 0 500 1100
   7       0 loop0 10 0 80 1 0 0 0 0 0 1 1
 259       0 nvme0n1 5000 0 10240 900 100 0 512 50 0 700 950
";

    #[test]
    fn diskstats_skips_partitions_and_loops() {
        let devices = parse_diskstats(DISKSTATS);
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["sda", "nvme0n1"]);
        assert_eq!(devices[0].read_bytes, 2048.0 * 512.0);
        assert_eq!(devices[0].write_bytes, 4096.0 * 512.0);
    }

    #[test]
    fn macos_rates_pass_through() {
        use crate::powermetrics::{DiskSample, PowerMetricsDoc};
        let doc = PowerMetricsDoc {
            disk: Some(DiskSample {
                rbytes_per_s: 111.0,
                wbytes_per_s: 222.0,
            }),
            ..Default::default()
        };
        let mut collector = MacDiskCollector;
        let batch = collector
            .collect(&PlatformContext::PowerMetrics(doc))
            .unwrap();
        assert_eq!(
            batch,
            vec![
                ("disk.total.read.bytes_per_sec".to_string(), 111.0),
                ("disk.total.write.bytes_per_sec".to_string(), 222.0),
            ]
        );
    }
}
