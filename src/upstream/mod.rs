//! Upstream pool connections: identity, reconnect bookkeeping, and the
//! transport seam the network layer implements.

mod client;
mod link;

pub use client::{Client, ClientEvent, ClientState};
pub use link::{ChannelLink, Link, LinkCommand, LinkEvent, LinkFactory, TransportHandle};

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Process-unique identifier for upstream connections.
///
/// Id 0 is the reserved offline/synthetic sentinel; real connections
/// count up from 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Sentinel for synthetic upstreams (benchmark and self-test traffic).
    pub const OFFLINE: ConnectionId = ConnectionId(0);

    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_offline(&self) -> bool {
        *self == Self::OFFLINE
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Identity of an upstream connection, reported with lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
