//! Polling sampler for platforms where collectors read the OS directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::sample::{PlatformContext, Sample, unix_now};

/// Fixed-cadence sampler that emits bare `Polling` contexts.
///
/// The loop tracks an absolute deadline rather than sleeping a fixed amount,
/// so collector time does not accumulate drift across ticks.
pub struct PollingSampler {
    period: Duration,
}

impl PollingSampler {
    pub fn new(refresh_ms: u64) -> Self {
        Self {
            period: Duration::from_millis(refresh_ms),
        }
    }

    /// Invoke the callback once per period until shutdown is requested.
    /// The callback runs under no lock and is expected to finish well inside
    /// one period.
    pub fn run(&self, shutdown: &AtomicBool, mut on_sample: impl FnMut(Sample)) {
        let start = Instant::now();
        let mut ticks: u32 = 0;

        while !shutdown.load(Ordering::Relaxed) {
            on_sample(Sample {
                timestamp: unix_now(),
                context: PlatformContext::Polling {
                    timestamp: unix_now(),
                },
            });
            ticks += 1;
            let deadline = self.period * ticks;
            let elapsed = start.elapsed();
            if deadline > elapsed {
                std::thread::sleep(deadline - elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn stops_when_shutdown_is_set() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let count = Arc::new(AtomicUsize::new(0));

        let sampler = PollingSampler::new(1);
        let flag = Arc::clone(&shutdown);
        let n = Arc::clone(&count);
        sampler.run(&shutdown, move |sample| {
            assert!(matches!(sample.context, PlatformContext::Polling { .. }));
            if n.fetch_add(1, Ordering::Relaxed) >= 2 {
                flag.store(true, Ordering::Relaxed);
            }
        });
        assert!(count.load(Ordering::Relaxed) >= 3);
    }
}
