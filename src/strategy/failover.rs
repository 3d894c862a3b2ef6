use std::collections::VecDeque;
use std::time::Instant;

use tracing::debug;

use crate::config::{PoolConfig, RetryConfig};
use crate::protocol::SubmitRequest;
use crate::upstream::{Client, ClientEvent, ConnectionInfo, LinkFactory};

use super::{Strategy, StrategyEvent};

/// Ordered pool list with failover and failback.
///
/// Priority is list order. One probe cursor walks the candidates: a
/// candidate gets `retries` attempts (retry-pause apart) before the
/// cursor advances, wrapping at the end of the list. While a
/// lower-priority pool is active the cursor keeps cycling the pools
/// ahead of it; whenever one of them logs in it preempts the active
/// connection, which is closed.
pub struct FailoverStrategy {
    clients: Vec<Client>,
    retries: u32,
    events: VecDeque<StrategyEvent>,
    active: Option<usize>,
    probe: usize,
    stopped: bool,
}

impl FailoverStrategy {
    pub fn new(pools: &[PoolConfig], retry: &RetryConfig, links: &dyn LinkFactory) -> Self {
        let clients = pools
            .iter()
            .map(|pool| Client::new(pool.clone(), retry.pause, links.create(pool)))
            .collect();

        Self {
            clients,
            retries: retry.retries,
            events: VecDeque::new(),
            active: None,
            probe: 0,
            stopped: false,
        }
    }

    fn handle(&mut self, index: usize, event: ClientEvent) {
        match event {
            ClientEvent::Connected => match self.active {
                None => self.activate(index),
                // a higher-priority pool came back: failback
                Some(current) if index < current => self.activate(index),
                Some(current) if index == current => {}
                Some(_) => self.clients[index].disconnect(),
            },
            ClientEvent::Job(job) => {
                if self.active == Some(index) {
                    self.events
                        .push_back(StrategyEvent::Job(self.clients[index].info(), job));
                }
            }
            ClientEvent::Result { result, error } => {
                // in-flight verdicts from a just-preempted connection still count
                self.events.push_back(StrategyEvent::Result {
                    connection: self.clients[index].info(),
                    result,
                    error,
                });
            }
            ClientEvent::Closed { failures } => {
                if self.active == Some(index) {
                    self.active = None;
                    self.events.push_back(StrategyEvent::Paused);
                }

                if index == self.probe && failures >= u64::from(self.retries) {
                    // candidate exhausted; stop its retry loop and move on
                    self.clients[index].disconnect();
                    self.advance_probe();
                }
            }
        }
    }

    fn activate(&mut self, index: usize) {
        if let Some(previous) = self.active.take() {
            if previous != index {
                debug!(
                    "failback: {} preempts {}",
                    self.clients[index].pool(),
                    self.clients[previous].pool()
                );
                self.clients[previous].disconnect();
            }
        }

        self.active = Some(index);
        self.events
            .push_back(StrategyEvent::Active(self.clients[index].info()));

        // keep probing the pools ahead of a non-primary active
        self.probe = 0;
        if index > 0 {
            self.clients[0].connect();
        }
    }

    fn advance_probe(&mut self) {
        // with an active connection only higher-priority pools are
        // probed; otherwise the whole list, wrapping at the end
        let limit = self.active.unwrap_or(self.clients.len());
        if limit == 0 {
            return;
        }

        self.probe = (self.probe + 1) % limit;
        self.clients[self.probe].connect();
    }
}

impl Strategy for FailoverStrategy {
    fn connect(&mut self) {
        if self.stopped {
            return;
        }

        self.probe = 0;
        self.clients[0].connect();
    }

    fn stop(&mut self) {
        self.stopped = true;

        for client in &mut self.clients {
            client.disconnect();
        }

        if self.active.take().is_some() {
            self.events.push_back(StrategyEvent::Paused);
        }
    }

    fn submit(&mut self, request: &SubmitRequest) {
        if let Some(index) = self.active {
            self.clients[index].submit(request);
        }
    }

    fn tick(&mut self, now: Instant) {
        if self.stopped {
            return;
        }

        let mut raw = Vec::new();
        for (index, client) in self.clients.iter_mut().enumerate() {
            let mut events = Vec::new();
            client.tick(now, &mut events);
            raw.extend(events.into_iter().map(|event| (index, event)));
        }

        for (index, event) in raw {
            self.handle(index, event);
        }
    }

    fn poll_event(&mut self) -> Option<StrategyEvent> {
        self.events.pop_front()
    }

    fn is_active(&self) -> bool {
        self.active
            .is_some_and(|index| self.clients[index].is_connected())
    }

    fn active_connection(&self) -> Option<ConnectionInfo> {
        self.active.map(|index| self.clients[index].info())
    }
}
