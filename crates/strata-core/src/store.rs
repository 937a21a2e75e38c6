//! Ring-buffer metric store.
//!
//! One writer (the sampling worker), many readers (renderer, HTTP workers,
//! CSV writer). A single `RwLock` protects the whole store; ingest takes it
//! exclusively so a snapshot either sees all of a tick's writes or none of
//! them. Series are created lazily on first sight and never destroyed, and
//! their insertion order is what the UI uses for vertical layout.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// A fixed-width read of one series, used directly by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesWindow {
    /// Exactly `cols` values, zero-padded on the left when the series is
    /// shorter than the requested width.
    pub values: Vec<f64>,
    /// How many trailing entries of `values` are real samples.
    pub filled: usize,
    /// Maximum over the real samples in this window (0.0 when empty).
    pub max: f64,
}

impl SeriesWindow {
    fn empty(cols: usize) -> Self {
        Self {
            values: vec![0.0; cols],
            filled: 0,
            max: 0.0,
        }
    }
}

struct Inner {
    names: Vec<String>,
    series: Vec<VecDeque<f64>>,
    index: HashMap<String, usize>,
}

pub struct MetricStore {
    inner: RwLock<Inner>,
    capacity: usize,
    ticks: AtomicU64,
}

impl MetricStore {
    /// Create a store with the given per-series capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                names: Vec::new(),
                series: Vec::new(),
                index: HashMap::new(),
            }),
            capacity: capacity.max(1),
            ticks: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of completed ingests. Readers use this to detect new data.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Append one tick's worth of values under the exclusive lock.
    pub fn ingest(&self, batch: Vec<(String, f64)>) {
        {
            let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
            for (name, value) in batch {
                let idx = match inner.index.get(&name) {
                    Some(idx) => *idx,
                    None => {
                        let idx = inner.names.len();
                        inner.names.push(name.clone());
                        inner.series.push(VecDeque::with_capacity(self.capacity));
                        inner.index.insert(name, idx);
                        idx
                    }
                };
                let ring = &mut inner.series[idx];
                if ring.len() == self.capacity {
                    ring.pop_front();
                }
                ring.push_back(value);
            }
        }
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Read a window of `cols` values ending `offset` samples before the
    /// newest one. `cols == 0` returns empty without taking the lock.
    pub fn window(&self, name: &str, cols: usize, offset: usize) -> SeriesWindow {
        if cols == 0 {
            return SeriesWindow {
                values: Vec::new(),
                filled: 0,
                max: 0.0,
            };
        }
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let Some(&idx) = inner.index.get(name) else {
            return SeriesWindow::empty(cols);
        };
        let ring = &inner.series[idx];
        let end = ring.len().saturating_sub(offset);
        let take = cols.min(end);
        let start = end - take;

        let mut values = vec![0.0; cols - take];
        let mut max = 0.0_f64;
        for i in start..end {
            let v = ring[i];
            if v > max {
                max = v;
            }
            values.push(v);
        }
        SeriesWindow {
            values,
            filled: take,
            max,
        }
    }

    /// Newest value of a series, if it exists.
    pub fn latest(&self, name: &str) -> Option<f64> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let idx = *inner.index.get(name)?;
        inner.series[idx].back().copied()
    }

    /// All series names in first-seen order.
    pub fn series_names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.names.clone()
    }

    /// Names belonging to one metric domain (`cpu` matches `cpu.*`),
    /// in first-seen order.
    pub fn names_in_domain(&self, domain: &str) -> Vec<String> {
        let prefix = format!("{domain}.");
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .names
            .iter()
            .filter(|n| n.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Full copy of every series (oldest to newest), in first-seen order.
    /// Used by the HTTP and Prometheus endpoints.
    pub fn snapshot_all(&self) -> Vec<(String, Vec<f64>)> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .names
            .iter()
            .zip(inner.series.iter())
            .map(|(name, ring)| (name.clone(), ring.iter().copied().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(n, v)| (n.to_string(), *v)).collect()
    }

    #[test]
    fn ingest_then_window_round_trip() {
        let store = MetricStore::new(10);
        store.ingest(batch(&[("cpu.total.count", 8.0)]));
        let w = store.window("cpu.total.count", 1, 0);
        assert_eq!(w.values, vec![8.0]);
        assert_eq!(w.filled, 1);
    }

    #[test]
    fn capacity_discards_oldest() {
        let store = MetricStore::new(3);
        for i in 0..5 {
            store.ingest(batch(&[("m", i as f64)]));
        }
        let w = store.window("m", 3, 0);
        assert_eq!(w.values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn capacity_one_keeps_only_newest() {
        let store = MetricStore::new(1);
        store.ingest(batch(&[("m", 1.0)]));
        store.ingest(batch(&[("m", 2.0)]));
        let w = store.window("m", 1, 0);
        assert_eq!(w.values, vec![2.0]);
        assert_eq!(w.filled, 1);
    }

    #[test]
    fn window_left_pads_with_zeros() {
        let store = MetricStore::new(10);
        store.ingest(batch(&[("m", 5.0)]));
        let w = store.window("m", 4, 0);
        assert_eq!(w.values, vec![0.0, 0.0, 0.0, 5.0]);
        assert_eq!(w.filled, 1);
        assert_eq!(w.max, 5.0);
    }

    #[test]
    fn window_offset_freezes_tail() {
        let store = MetricStore::new(10);
        for i in 1..=6 {
            store.ingest(batch(&[("m", i as f64)]));
        }
        let w = store.window("m", 3, 3);
        assert_eq!(w.values, vec![1.0, 2.0, 3.0]);
        let live = store.window("m", 3, 0);
        assert_eq!(live.values, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn window_offset_past_history_is_all_padding() {
        let store = MetricStore::new(10);
        store.ingest(batch(&[("m", 1.0)]));
        let w = store.window("m", 2, 5);
        assert_eq!(w.values, vec![0.0, 0.0]);
        assert_eq!(w.filled, 0);
    }

    #[test]
    fn zero_cols_returns_empty() {
        let store = MetricStore::new(10);
        let w = store.window("missing", 0, 0);
        assert!(w.values.is_empty());
    }

    #[test]
    fn series_order_is_first_seen() {
        let store = MetricStore::new(10);
        store.ingest(batch(&[("b.x", 1.0), ("a.x", 1.0)]));
        store.ingest(batch(&[("c.x", 1.0), ("a.x", 2.0)]));
        assert_eq!(store.series_names(), vec!["b.x", "a.x", "c.x"]);
    }

    #[test]
    fn domain_filter_matches_prefix_only() {
        let store = MetricStore::new(10);
        store.ingest(batch(&[
            ("cpu.total.count", 8.0),
            ("cpuish.other", 1.0),
            ("cpu.cpu.0.total.utilization.percent", 10.0),
        ]));
        assert_eq!(
            store.names_in_domain("cpu"),
            vec!["cpu.total.count", "cpu.cpu.0.total.utilization.percent"]
        );
    }

    #[test]
    fn ticks_advance_per_ingest() {
        let store = MetricStore::new(10);
        assert_eq!(store.ticks(), 0);
        store.ingest(batch(&[("m", 1.0)]));
        store.ingest(batch(&[("m", 2.0)]));
        assert_eq!(store.ticks(), 2);
    }

    #[test]
    fn concurrent_readers_never_see_partial_ticks() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MetricStore::new(100));
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200 {
                    store.ingest(batch(&[("a", i as f64), ("b", i as f64)]));
                }
            })
        };
        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let a = store.window("a", 1, 0);
                    let b = store.window("b", 1, 0);
                    // Both series are written in the same exclusive-locked
                    // ingest. `b` is read after `a`, so it can only be at the
                    // same tick or a later one, never behind: a torn ingest
                    // would show up here as b < a.
                    if a.filled == 1 && b.filled == 1 {
                        assert!(b.values[0] >= a.values[0]);
                    }
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
    }
}
