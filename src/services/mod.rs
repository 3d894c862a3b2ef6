/// Lock-free counters for the share relay path
pub mod metrics;
