//! Thread-safe pool of reusable bucket tables

use crate::config::PoolConfig;
use crate::table::{BucketTable, PoolStats};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

struct PoolState {
    idle: Vec<BucketTable>,
    in_use: usize,
}

struct PoolInner {
    state: Mutex<PoolState>,
    config: PoolConfig,
    stats: PoolStats,
}

impl PoolInner {
    fn put_back(&self, mut table: BucketTable) {
        table.clear();
        if table.capacity() > self.config.max_retained_capacity {
            tracing::debug!(
                capacity = table.capacity(),
                max_retained_capacity = self.config.max_retained_capacity,
                "Shrinking released bucket table"
            );
            table.shrink_to(self.config.initial_capacity);
        }
        let mut state = self.state.lock();
        state.in_use -= 1;
        let kept = state.idle.len() < self.config.max_idle;
        if kept {
            state.idle.push(table);
        }
        let in_use = state.in_use;
        metrics::gauge!("prism_terms_tables_in_use").set(in_use as f64);
        drop(state);
        tracing::trace!(in_use, kept, "Released bucket table");
        self.stats.release();
    }
}

/// Hands out bucket tables and takes them back once a pass is done.
///
/// At most `max_tables` tables are checked out at any time; up to `max_idle`
/// released tables are kept, with their allocations, for the next pass.
/// Cloning the pool shares the same tables.
#[derive(Clone)]
pub struct TablePool {
    inner: Arc<PoolInner>,
}

impl TablePool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    idle: Vec::new(),
                    in_use: 0,
                }),
                config,
                stats: PoolStats::new(),
            }),
        }
    }

    pub fn acquire(&self) -> Result<PooledTable> {
        let mut state = self.inner.state.lock();
        let max_tables = self.inner.config.max_tables;
        if state.in_use >= max_tables {
            drop(state);
            self.inner.stats.exhaust();
            tracing::warn!("Bucket table pool exhausted ({} tables in use)", max_tables);
            return Err(Error::PoolExhausted { max_tables });
        }

        state.in_use += 1;
        let recycled = state.idle.pop();
        metrics::gauge!("prism_terms_tables_in_use").set(state.in_use as f64);
        drop(state);

        let fresh = recycled.is_none();
        let table = recycled
            .unwrap_or_else(|| BucketTable::with_capacity(self.inner.config.initial_capacity));
        self.inner.stats.acquire(fresh);

        Ok(PooledTable {
            table,
            pool: Arc::clone(&self.inner),
        })
    }

    pub fn in_use(&self) -> usize {
        self.inner.state.lock().in_use
    }

    pub fn idle(&self) -> usize {
        self.inner.state.lock().idle.len()
    }

    pub fn stats(&self) -> &PoolStats {
        &self.inner.stats
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }
}

impl Default for TablePool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// A table checked out of a [`TablePool`].
///
/// The table goes back to the pool exactly once: on [`PooledTable::release`]
/// or when the guard is dropped. Both consume the guard, so a released table
/// can no longer be reached through it.
pub struct PooledTable {
    table: BucketTable,
    pool: Arc<PoolInner>,
}

impl PooledTable {
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for PooledTable {
    type Target = BucketTable;

    fn deref(&self) -> &Self::Target {
        &self.table
    }
}

impl DerefMut for PooledTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.table
    }
}

impl Drop for PooledTable {
    fn drop(&mut self) {
        let table = std::mem::take(&mut self.table);
        self.pool.put_back(table);
    }
}
