//! Downstream session endpoint interface.

use crate::job::Job;
use crate::protocol::SubmitResult;
use crate::upstream::ConnectionInfo;

/// One downstream miner connection, owned by the session front end.
///
/// The core holds a non-owning reference and must tolerate the session
/// disappearing at any time; every call site checks for presence first.
/// Methods take `&self`: implementations deliver through their own
/// outbound queues.
pub trait MinerSession: Send + Sync {
    /// Record which mapper this session is bound to.
    fn set_mapper_id(&self, id: u64);

    /// Push a new job to the miner.
    fn set_job(&self, job: &Job);

    /// Reply to a miner request with a success message.
    fn reply_success(&self, request_id: i64, message: &str);

    /// Reply to a miner request with an error message.
    fn reply_error(&self, request_id: i64, message: &str);

    /// Bookkeeping notification for an upstream verdict, fired for
    /// accepted and rejected shares alike.
    fn on_pool_result(&self, connection: &ConnectionInfo, result: &SubmitResult);
}
