use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::upstream::ConnectionId;

/// One unit of work issued by an upstream pool.
///
/// Immutable once constructed; cloned when stored as the mapper's
/// current or previous job. A default-constructed job has no id and
/// never matches a validity check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: String,
    connection: ConnectionId,
    difficulty: u64,
    payload: Value,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        connection: ConnectionId,
        difficulty: u64,
        payload: Value,
    ) -> Self {
        Self {
            id: id.into(),
            connection,
            difficulty,
            payload,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The upstream connection this job originated from.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn difficulty(&self) -> u64 {
        self.difficulty
    }

    /// Opaque, already-decoded work payload pushed to the client.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
    }

    /// Re-tag the job with the connection that delivered it. Links hand
    /// jobs over untagged; the owning client stamps its own id.
    pub fn with_connection(mut self, connection: ConnectionId) -> Self {
        self.connection = connection;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_job_is_invalid() {
        assert!(!Job::default().is_valid());
    }

    #[test]
    fn test_job_fields() {
        let conn = ConnectionId::next();
        let job = Job::new("j1", conn, 5000, json!({"blob": "00ff"}));

        assert!(job.is_valid());
        assert_eq!(job.id(), "j1");
        assert_eq!(job.connection(), conn);
        assert_eq!(job.difficulty(), 5000);
        assert_eq!(job.payload()["blob"], "00ff");
    }
}
