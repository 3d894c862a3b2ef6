#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use stratum_mux::config::{Config, PoolConfig};
use stratum_mux::job::Job;
use stratum_mux::protocol::{LoginRequest, SubmitRequest, SubmitResult};
use stratum_mux::session::MinerSession;
use stratum_mux::upstream::{ConnectionId, ConnectionInfo, Link, LinkEvent, LinkFactory};

#[derive(Default)]
pub struct LinkState {
    pub opened: u32,
    pub closed: u32,
    pub submitted: Vec<SubmitRequest>,
    pub queue: VecDeque<LinkEvent>,
}

/// Test-side handle to one fake transport link: scripts events in,
/// observes commands out.
#[derive(Clone, Default)]
pub struct LinkHandle(Arc<Mutex<LinkState>>);

impl LinkHandle {
    pub fn push(&self, event: LinkEvent) {
        self.0.lock().unwrap().queue.push_back(event);
    }

    pub fn push_connected(&self) {
        self.push(LinkEvent::Connected);
    }

    pub fn push_closed(&self) {
        self.push(LinkEvent::Closed);
    }

    pub fn push_job(&self, id: &str, difficulty: u64) {
        self.push(LinkEvent::Job(Job::new(
            id,
            ConnectionId::OFFLINE,
            difficulty,
            serde_json::Value::Null,
        )));
    }

    pub fn push_result(&self, request_id: i64, error: Option<&str>) {
        self.push(LinkEvent::Result {
            result: SubmitResult {
                request_id,
                difficulty: 0,
                fake: false,
            },
            error: error.map(String::from),
        });
    }

    pub fn opened(&self) -> u32 {
        self.0.lock().unwrap().opened
    }

    pub fn closed(&self) -> u32 {
        self.0.lock().unwrap().closed
    }

    pub fn submitted(&self) -> Vec<SubmitRequest> {
        self.0.lock().unwrap().submitted.clone()
    }
}

struct FakeLink(LinkHandle);

impl Link for FakeLink {
    fn open(&mut self) {
        self.0 .0.lock().unwrap().opened += 1;
    }

    fn close(&mut self) {
        let mut state = self.0 .0.lock().unwrap();
        state.closed += 1;
        // a cancelled attempt delivers nothing
        state.queue.clear();
    }

    fn submit(&mut self, request: &SubmitRequest) {
        self.0 .0.lock().unwrap().submitted.push(request.clone());
    }

    fn poll(&mut self) -> Option<LinkEvent> {
        self.0 .0.lock().unwrap().queue.pop_front()
    }
}

/// Link factory handing out scripted links, keyed by pool address.
#[derive(Default)]
pub struct FakeLinks {
    handles: Mutex<HashMap<String, Vec<LinkHandle>>>,
}

impl FakeLinks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Latest link created for a pool address.
    pub fn handle(&self, address: &str) -> LinkHandle {
        self.handles
            .lock()
            .unwrap()
            .get(address)
            .and_then(|links| links.last())
            .cloned()
            .unwrap_or_else(|| panic!("no link created for {address}"))
    }

    /// How many links were created for a pool address.
    pub fn link_count(&self, address: &str) -> usize {
        self.handles
            .lock()
            .unwrap()
            .get(address)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl LinkFactory for FakeLinks {
    fn create(&self, pool: &PoolConfig) -> Box<dyn Link> {
        let handle = LinkHandle::default();
        self.handles
            .lock()
            .unwrap()
            .entry(pool.address())
            .or_default()
            .push(handle.clone());
        Box::new(FakeLink(handle))
    }
}

/// Records every call the core makes into the session.
#[derive(Default)]
pub struct FakeSession {
    pub mapper_ids: Mutex<Vec<u64>>,
    pub jobs: Mutex<Vec<Job>>,
    pub successes: Mutex<Vec<(i64, String)>>,
    pub errors: Mutex<Vec<(i64, String)>>,
    pub pool_results: Mutex<Vec<(ConnectionInfo, SubmitResult)>>,
}

impl MinerSession for FakeSession {
    fn set_mapper_id(&self, id: u64) {
        self.mapper_ids.lock().unwrap().push(id);
    }

    fn set_job(&self, job: &Job) {
        self.jobs.lock().unwrap().push(job.clone());
    }

    fn reply_success(&self, request_id: i64, message: &str) {
        self.successes
            .lock()
            .unwrap()
            .push((request_id, message.to_string()));
    }

    fn reply_error(&self, request_id: i64, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((request_id, message.to_string()));
    }

    fn on_pool_result(&self, connection: &ConnectionInfo, result: &SubmitResult) {
        self.pool_results
            .lock()
            .unwrap()
            .push((connection.clone(), result.clone()));
    }
}

pub fn pool(host: &str, port: u16) -> PoolConfig {
    PoolConfig {
        host: host.to_string(),
        port,
        user: "wallet.worker".to_string(),
        password: None,
    }
}

pub fn config(pools: Vec<PoolConfig>) -> Arc<Config> {
    Arc::new(Config {
        pools,
        retry: Default::default(),
        log: Default::default(),
        limiter: Default::default(),
        donate: Default::default(),
    })
}

pub fn login_request(user: &str) -> LoginRequest {
    LoginRequest {
        id: 1,
        user: user.to_string(),
        password: None,
        agent: Some("test-miner/1.0".to_string()),
    }
}
