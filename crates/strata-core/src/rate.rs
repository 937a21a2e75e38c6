//! Monotonic counter to per-second rate conversion.

use std::collections::HashMap;

/// Converts cumulative byte/event counters into per-second rates.
///
/// The first observation of a key yields 0 (there is nothing to diff
/// against). A counter that goes backwards (interface recreated, device
/// reset) also yields 0 rather than a negative rate.
#[derive(Debug, Clone)]
pub struct RateReader {
    interval_s: f64,
    last: HashMap<String, f64>,
}

impl RateReader {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_s: interval_ms as f64 / 1000.0,
            last: HashMap::new(),
        }
    }

    pub fn next(&mut self, key: &str, sample: f64) -> f64 {
        let rate = match self.last.get(key) {
            None => 0.0,
            Some(prev) if sample < *prev => 0.0,
            Some(prev) => (sample - prev) / self.interval_s,
        };
        self.last.insert(key.to_string(), sample);
        rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_returns_zero() {
        let mut r = RateReader::new(1000);
        assert_eq!(r.next("k", 100.0), 0.0);
    }

    #[test]
    fn positive_rate() {
        let mut r = RateReader::new(1000);
        r.next("k", 100.0);
        assert_eq!(r.next("k", 200.0), 100.0);
    }

    #[test]
    fn counter_reset_clamps_to_zero() {
        let mut r = RateReader::new(1000);
        r.next("k", 200.0);
        assert_eq!(r.next("k", 100.0), 0.0);
        // The reset value becomes the new baseline.
        assert_eq!(r.next("k", 150.0), 50.0);
    }

    #[test]
    fn interval_scales_rate() {
        let mut r = RateReader::new(2000);
        r.next("k", 100.0);
        assert_eq!(r.next("k", 200.0), 50.0);
    }

    #[test]
    fn keys_are_independent() {
        let mut r = RateReader::new(1000);
        r.next("a", 100.0);
        r.next("b", 200.0);
        assert_eq!(r.next("a", 150.0), 50.0);
        assert_eq!(r.next("b", 250.0), 50.0);
    }

    #[test]
    fn disk_counter_scenario() {
        let counters = [100.0, 300.0, 350.0, 350.0, 340.0, 500.0];
        let mut r = RateReader::new(1000);
        let rates: Vec<f64> = counters.iter().map(|&c| r.next("disk", c)).collect();
        assert_eq!(rates, vec![0.0, 200.0, 50.0, 0.0, 0.0, 160.0]);
    }
}
