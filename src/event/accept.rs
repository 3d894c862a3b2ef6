use std::sync::atomic::Ordering;

use crate::protocol::SubmitResult;
use crate::services::metrics::Counters;

/// Observability record emitted once per upstream verdict, for
/// accepted and rejected shares alike.
#[derive(Debug)]
pub struct AcceptEvent {
    pub mapper_id: u64,
    pub result: SubmitResult,
    /// Upstream rejection reason, relayed verbatim; `None` means accepted
    pub error: Option<String>,
    /// Verdict produced by a synthetic/offline upstream
    pub offline: bool,
}

impl AcceptEvent {
    pub fn new(
        mapper_id: u64,
        result: SubmitResult,
        error: Option<String>,
        offline: bool,
    ) -> Self {
        Self {
            mapper_id,
            result,
            error,
            offline,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }

    /// Record the verdict in the metrics sink.
    pub fn record(&self, counters: &Counters) {
        if self.is_rejected() {
            counters.rejected.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("shares_rejected_total", "synthetic" => self.offline.to_string())
                .increment(1);
        } else {
            counters.accepted.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("shares_accepted_total", "synthetic" => self.offline.to_string())
                .increment(1);
            metrics::histogram!("share_difficulty").record(self.result.difficulty as f64);
        }
    }
}
