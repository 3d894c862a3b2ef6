use std::collections::VecDeque;
use std::time::Instant;

use crate::config::{PoolConfig, RetryConfig};
use crate::protocol::SubmitRequest;
use crate::upstream::{Client, ClientEvent, ConnectionInfo, LinkFactory};

use super::{Strategy, StrategyEvent};

/// One pool, retried forever: on loss the connection is reattempted
/// after the configured pause, never abandoned.
pub struct SinglePoolStrategy {
    client: Client,
    events: VecDeque<StrategyEvent>,
    active: bool,
    stopped: bool,
}

impl SinglePoolStrategy {
    pub fn new(pool: PoolConfig, retry: &RetryConfig, links: &dyn LinkFactory) -> Self {
        let link = links.create(&pool);

        Self {
            client: Client::new(pool, retry.pause, link),
            events: VecDeque::new(),
            active: false,
            stopped: false,
        }
    }

    fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Connected => {
                self.active = true;
                self.events
                    .push_back(StrategyEvent::Active(self.client.info()));
            }
            ClientEvent::Job(job) => {
                self.events
                    .push_back(StrategyEvent::Job(self.client.info(), job));
            }
            ClientEvent::Result { result, error } => {
                self.events.push_back(StrategyEvent::Result {
                    connection: self.client.info(),
                    result,
                    error,
                });
            }
            ClientEvent::Closed { .. } => {
                // the client schedules its own retry; pause until it lands
                if self.active {
                    self.active = false;
                    self.events.push_back(StrategyEvent::Paused);
                }
            }
        }
    }
}

impl Strategy for SinglePoolStrategy {
    fn connect(&mut self) {
        if self.stopped {
            return;
        }
        self.client.connect();
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.client.disconnect();

        if self.active {
            self.active = false;
            self.events.push_back(StrategyEvent::Paused);
        }
    }

    fn submit(&mut self, request: &SubmitRequest) {
        self.client.submit(request);
    }

    fn tick(&mut self, now: Instant) {
        if self.stopped {
            return;
        }

        let mut raw = Vec::new();
        self.client.tick(now, &mut raw);

        for event in raw {
            self.handle(event);
        }
    }

    fn poll_event(&mut self) -> Option<StrategyEvent> {
        self.events.pop_front()
    }

    fn is_active(&self) -> bool {
        self.active && self.client.is_connected()
    }

    fn active_connection(&self) -> Option<ConnectionInfo> {
        self.active.then(|| self.client.info())
    }
}
