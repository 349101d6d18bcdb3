use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default, Debug)]
pub struct Counters {
    pub ticks_received: Arc<AtomicU64>,
    pub decode_errors: Arc<AtomicU64>,

    pub alerts_emitted: Arc<AtomicU64>,
    // alert channel full or closed
    pub alerts_dropped: Arc<AtomicU64>,
    pub deliveries_failed: Arc<AtomicU64>,

    pub reconnects: Arc<AtomicU64>,
}

/// Point-in-time copy of [`Counters`], suitable for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub ticks_received: u64,
    pub decode_errors: u64,
    pub alerts_emitted: u64,
    pub alerts_dropped: u64,
    pub deliveries_failed: u64,
    pub reconnects: u64,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            ticks_received: self.ticks_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            alerts_emitted: self.alerts_emitted.load(Ordering::Relaxed),
            alerts_dropped: self.alerts_dropped.load(Ordering::Relaxed),
            deliveries_failed: self.deliveries_failed.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}
