//! # Stratum Mux
//!
//! Miner-to-pool multiplexing core for Stratum reverse proxies:
//! - One logical upstream connection ("mapper") per downstream client
//! - Single-pool and failover upstream selection with tick-gated
//!   reconnects and priority failback
//! - Two-generation job-freshness window so shares racing a job switch
//!   are not penalized
//! - Single-slot event arena on the high-frequency submit/accept path
//!
//! ## Architecture
//!
//! The crate operates on already-decoded value objects; the wire codec,
//! TCP listener, and login handshake live outside it:
//! - **Session seam**: [`session::MinerSession`], implemented by the
//!   downstream front end
//! - **Transport seam**: [`upstream::Link`] / [`upstream::LinkFactory`],
//!   implemented by the network layer ([`upstream::ChannelLink`] bridges
//!   async transport tasks onto the processing context)
//! - **Core**: [`Mapper`] orchestration driven by a once-per-second
//!   tick on a single logical processing context
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! use stratum_mux::upstream::{ChannelLink, Link, LinkFactory};
//! use stratum_mux::{Config, Splitter};
//!
//! struct Transport;
//!
//! impl LinkFactory for Transport {
//!     fn create(&self, _pool: &stratum_mux::config::PoolConfig) -> Box<dyn Link> {
//!         let (link, handle) = ChannelLink::pair();
//!         // hand `handle` to the task that owns the socket
//!         # drop(handle);
//!         Box::new(link)
//!     }
//! }
//!
//! let config = Arc::new(Config::load_from_file("config.toml").unwrap());
//! let mut splitter = Splitter::new(config, Arc::new(Transport));
//! splitter.tick(0, Instant::now());
//! ```

/// Core configuration management
pub mod config;

/// Typed errors and the closed share-rejection taxonomy
pub mod error;

/// Submit/accept events and the single-slot arena
pub mod event;

/// Mining job value type
pub mod job;

/// Mapper orchestration: job relay, share validation, pool reload
pub mod mapper;

/// Already-decoded protocol value objects
pub mod protocol;

/// Downstream session endpoint interface
pub mod session;

/// Metrics counters for the relay path
pub mod services;

/// Mapper registry and idle sweeper
pub mod splitter;

/// Upstream selection policies: single-pool and failover
pub mod strategy;

/// Upstream connections and the transport seam
pub mod upstream;

// === PUBLIC API EXPORTS ===

/// Configuration for the multiplexing core.
pub use config::Config;

/// Error types and result handling.
pub use error::{ConfigError, ErrorCode, Result, StratumError};

/// The orchestration unit bound to one downstream session.
pub use mapper::Mapper;

/// Registry owning all mappers for the one-mapper-per-client model.
pub use splitter::Splitter;
