//! Upstream selection policies. A strategy owns one or more pool
//! connections, reports at most one of them as active, and buffers
//! lifecycle events its owner drains after every driving call.

mod failover;
mod single;

pub use failover::FailoverStrategy;
pub use single::SinglePoolStrategy;

use std::sync::Arc;
use std::time::Instant;

use crate::config::{PoolConfig, RetryConfig};
use crate::job::Job;
use crate::protocol::{SubmitRequest, SubmitResult};
use crate::upstream::{ConnectionInfo, LinkFactory};

/// Lifecycle notification produced by a strategy.
#[derive(Debug, Clone)]
pub enum StrategyEvent {
    /// A connection finished login and is now the active upstream.
    Active(ConnectionInfo),
    /// New job from the active connection.
    Job(ConnectionInfo, Job),
    /// The active connection was lost; nothing is usable until the
    /// next `Active`.
    Paused,
    /// Upstream verdict for one forwarded submission. `error` is the
    /// pool's rejection reason, relayed verbatim.
    Result {
        connection: ConnectionInfo,
        result: SubmitResult,
        error: Option<String>,
    },
}

/// Upstream selection policy.
pub trait Strategy: Send {
    /// Begin or resume connecting. Asynchronous; success is reported
    /// through an [`StrategyEvent::Active`] event.
    fn connect(&mut self);

    /// Terminate all owned connections, cancelling in-flight connect
    /// attempts. Subsequent operations are no-ops.
    fn stop(&mut self);

    /// Forward a validated share to the active connection. Dropped
    /// silently when nothing is active; the owner gates this.
    fn submit(&mut self, request: &SubmitRequest);

    /// Advance reconnect timers and drain transport notifications.
    fn tick(&mut self, now: Instant);

    /// Next buffered lifecycle event, if any.
    fn poll_event(&mut self) -> Option<StrategyEvent>;

    /// Whether an upstream connection is currently usable.
    fn is_active(&self) -> bool;

    /// Identity of the active connection, when one exists.
    fn active_connection(&self) -> Option<ConnectionInfo>;
}

/// Build the right strategy for a pool list: a single-entry list gets
/// the single-pool reconnect policy, a longer list gets failover.
pub fn create(
    pools: &[PoolConfig],
    retry: &RetryConfig,
    links: &Arc<dyn LinkFactory>,
) -> Box<dyn Strategy> {
    debug_assert!(!pools.is_empty(), "pool list validated upstream");

    if pools.len() > 1 {
        Box::new(FailoverStrategy::new(pools, retry, links.as_ref()))
    } else {
        Box::new(SinglePoolStrategy::new(
            pools[0].clone(),
            retry,
            links.as_ref(),
        ))
    }
}
