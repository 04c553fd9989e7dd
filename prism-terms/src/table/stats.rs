//! Table pool statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for table pool activity, shared by every clone of a pool.
#[derive(Debug, Default)]
pub struct PoolStats {
    acquired: AtomicU64,
    released: AtomicU64,
    created: AtomicU64,
    exhausted: AtomicU64,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn acquire(&self, fresh: bool) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("prism_terms_tables_acquired_total").increment(1);
        if fresh {
            self.created.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("prism_terms_tables_created_total").increment(1);
        }
    }

    pub(crate) fn release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("prism_terms_tables_released_total").increment(1);
    }

    pub(crate) fn exhaust(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("prism_terms_pool_exhausted_total").increment(1);
    }

    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Tables allocated because no idle table was available.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn exhausted(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }

    pub fn reuse_rate(&self) -> f64 {
        let acquired = self.acquired();
        if acquired == 0 {
            0.0
        } else {
            (acquired - self.created()) as f64 / acquired as f64
        }
    }
}
