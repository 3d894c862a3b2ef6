//! Already-decoded value objects exchanged with the transport and
//! session layers. No on-wire byte format lives in this crate.

use serde::{Deserialize, Serialize};

/// Login request forwarded by the session front end when a miner
/// authenticates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Miner request id, echoed in the reply
    pub id: i64,
    pub user: String,
    pub password: Option<String>,
    pub agent: Option<String>,
}

/// A share submitted by a miner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Miner request id, echoed in the reply
    pub id: i64,
    pub job_id: String,
    pub nonce: String,
    pub result: String,
    /// Synthetic submission; the direct client reply is suppressed
    pub fake: bool,
    /// Overwritten with the current job's difficulty before the
    /// request goes upstream; any client-claimed value is ignored
    pub difficulty: u64,
}

impl SubmitRequest {
    pub fn new(
        id: i64,
        job_id: impl Into<String>,
        nonce: impl Into<String>,
        result: impl Into<String>,
        fake: bool,
    ) -> Self {
        Self {
            id,
            job_id: job_id.into(),
            nonce: nonce.into(),
            result: result.into(),
            fake,
            difficulty: 0,
        }
    }
}

/// Upstream verdict for one forwarded submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    /// Miner request id the verdict answers
    pub request_id: i64,
    /// Difficulty the share was credited at
    pub difficulty: u64,
    pub fake: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_starts_without_difficulty() {
        let request = SubmitRequest::new(7, "job-1", "deadbeef", "00ab", false);
        assert_eq!(request.difficulty, 0);
        assert!(!request.fake);
    }
}
