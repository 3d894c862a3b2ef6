//! Atomic counters for the relay hot path.
//!
//! Everything here is plain atomic increments so the submit/accept
//! cycle never takes a lock; aggregation and export live outside this
//! crate behind the `metrics` facade.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters for the share relay path.
#[derive(Debug, Default)]
pub struct Counters {
    /// Shares accepted against the previous (just-superseded) job
    pub expired_accepted: AtomicU64,
    /// Upstream-accepted shares
    pub accepted: AtomicU64,
    /// Upstream-rejected shares
    pub rejected: AtomicU64,
    /// Mappers created since startup
    pub mappers_created: AtomicU64,
    /// Dirty mappers re-bound to a reconnecting client
    pub mappers_reused: AtomicU64,
    /// Idle mappers reclaimed by the sweeper
    pub mappers_released: AtomicU64,
    /// Upstream switches: initial connect, failover, failback, reload
    pub pool_switches: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            expired_accepted: self.expired_accepted.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            mappers_created: self.mappers_created.load(Ordering::Relaxed),
            mappers_reused: self.mappers_reused.load(Ordering::Relaxed),
            mappers_released: self.mappers_released.load(Ordering::Relaxed),
            pool_switches: self.pool_switches.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`Counters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub expired_accepted: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub mappers_created: u64,
    pub mappers_reused: u64,
    pub mappers_released: u64,
    pub pool_switches: u64,
}
