use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::PoolConfig;
use crate::job::Job;
use crate::protocol::{SubmitRequest, SubmitResult};

use super::link::{Link, LinkEvent};
use super::{ConnectionId, ConnectionInfo};

/// Connection state of one upstream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Not connecting; either never started or deliberately closed
    Idle,
    /// Connect + login sequence in flight
    Connecting,
    /// Logged in and usable
    Connected,
    /// Lost; waiting for the retry deadline
    Retrying,
}

/// What one driving pass over the link produced.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Connected,
    Job(Job),
    Result {
        result: SubmitResult,
        error: Option<String>,
    },
    /// Connection lost; `failures` counts consecutive losses since the
    /// last successful login.
    Closed { failures: u64 },
}

/// One upstream pool connection: a transport link plus the reconnect
/// bookkeeping the strategies decide policy over.
pub struct Client {
    id: ConnectionId,
    pool: PoolConfig,
    link: Box<dyn Link>,
    state: ClientState,
    failures: u64,
    retry_pause: Duration,
    retry_at: Option<Instant>,
}

impl Client {
    pub fn new(pool: PoolConfig, retry_pause: Duration, link: Box<dyn Link>) -> Self {
        Self {
            id: ConnectionId::next(),
            pool,
            link,
            state: ClientState::Idle,
            failures: 0,
            retry_pause,
            retry_at: None,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn pool(&self) -> &PoolConfig {
        &self.pool
    }

    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            host: self.pool.host.clone(),
            port: self.pool.port,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ClientState::Connected
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Begin or resume connecting. No-op while an attempt is already in
    /// flight or the connection is up.
    pub fn connect(&mut self) {
        if matches!(self.state, ClientState::Connecting | ClientState::Connected) {
            return;
        }

        debug!("{} connecting to {}", self.id, self.pool);
        self.state = ClientState::Connecting;
        self.retry_at = None;
        self.link.open();
    }

    /// Tear the connection down and stop retrying. Cancels an in-flight
    /// connect attempt.
    pub fn disconnect(&mut self) {
        self.link.close();
        self.state = ClientState::Idle;
        self.retry_at = None;
        self.failures = 0;
    }

    /// Forward a validated share. Dropped when the connection is not up.
    pub fn submit(&mut self, request: &SubmitRequest) {
        if self.state == ClientState::Connected {
            self.link.submit(request);
        }
    }

    /// Advance the retry timer and drain transport notifications into
    /// `events`.
    pub fn tick(&mut self, now: Instant, events: &mut Vec<ClientEvent>) {
        if self.state == ClientState::Retrying {
            if let Some(retry_at) = self.retry_at {
                if now >= retry_at {
                    self.state = ClientState::Idle;
                    self.connect();
                }
            }
        }

        while let Some(event) = self.link.poll() {
            match event {
                LinkEvent::Connected => {
                    self.state = ClientState::Connected;
                    self.failures = 0;
                    self.retry_at = None;
                    events.push(ClientEvent::Connected);
                }
                LinkEvent::Job(job) => {
                    events.push(ClientEvent::Job(job.with_connection(self.id)));
                }
                LinkEvent::Result { result, error } => {
                    events.push(ClientEvent::Result { result, error });
                }
                LinkEvent::Closed => {
                    if self.state == ClientState::Idle {
                        // deliberate close acknowledged by the transport
                        continue;
                    }

                    self.failures += 1;
                    self.state = ClientState::Retrying;
                    self.retry_at = Some(now + self.retry_pause);
                    debug!("{} lost {} (failures: {})", self.id, self.pool, self.failures);
                    events.push(ClientEvent::Closed {
                        failures: self.failures,
                    });
                }
            }
        }
    }
}
