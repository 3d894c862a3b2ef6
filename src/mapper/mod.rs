//! The orchestration unit binding one downstream session to one (or,
//! during a pool reload, two) upstream connection strategies.

use std::sync::{Arc, Weak};
use std::time::Instant;

use tracing::{info, warn};

use crate::config::{Config, PoolConfig};
use crate::error::ErrorCode;
use crate::event::{AcceptEvent, Arena, SubmitEvent};
use crate::job::Job;
use crate::protocol::{LoginRequest, SubmitResult};
use crate::services::metrics::Counters;
use crate::session::MinerSession;
use crate::strategy::{self, Strategy, StrategyEvent};
use crate::upstream::{ConnectionInfo, LinkFactory};

/// Which strategy slot produced a drained event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Active,
    Pending,
}

/// Double-buffered reload state. The pending strategy warms up in
/// parallel and replaces the active one only once it reports a
/// successful connection.
enum Pending {
    None,
    Connecting(Box<dyn Strategy>),
}

pub struct Mapper {
    id: u64,
    active: bool,
    dirty: bool,
    idle_ticks: u64,
    job: Job,
    prev_job: Job,
    strategy: Box<dyn Strategy>,
    pending: Pending,
    session: Option<Weak<dyn MinerSession>>,
    config: Arc<Config>,
    links: Arc<dyn LinkFactory>,
    arena: Arc<Arena>,
    counters: Arc<Counters>,
}

impl Mapper {
    pub fn new(
        id: u64,
        config: Arc<Config>,
        links: Arc<dyn LinkFactory>,
        arena: Arc<Arena>,
        counters: Arc<Counters>,
    ) -> Self {
        let strategy = strategy::create(&config.pools, &config.retry, &links);
        Self::with_strategy(id, strategy, config, links, arena, counters)
    }

    /// Build a mapper around an explicit strategy instead of deriving
    /// one from the configured pool list. Used for synthetic upstreams.
    pub fn with_strategy(
        id: u64,
        strategy: Box<dyn Strategy>,
        config: Arc<Config>,
        links: Arc<dyn LinkFactory>,
        arena: Arc<Arena>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            id,
            active: false,
            dirty: false,
            idle_ticks: 0,
            job: Job::default(),
            prev_job: Job::default(),
            strategy,
            pending: Pending::None,
            session: None,
            config,
            links,
            arena,
            counters,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether a usable upstream connection exists right now.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Client detached, mapper retained for possible reuse.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn idle_ticks(&self) -> u64 {
        self.idle_ticks
    }

    pub fn has_session(&self) -> bool {
        self.session().is_some()
    }

    /// Detached but still connected: a reconnecting client can take
    /// this mapper over without a fresh upstream handshake.
    pub fn is_reusable(&self) -> bool {
        self.dirty && self.active && !self.has_session()
    }

    /// A pool-list reload is in flight: the pending strategy has not
    /// reported a connection yet.
    pub fn is_reloading(&self) -> bool {
        matches!(self.pending, Pending::Connecting(_))
    }

    pub fn current_job(&self) -> &Job {
        &self.job
    }

    /// Bind a session to this mapper and start connecting upstream.
    /// Re-binding the same session is harmless.
    pub fn attach(&mut self, session: &Arc<dyn MinerSession>, _request: &LoginRequest) {
        session.set_mapper_id(self.id);
        self.session = Some(Arc::downgrade(session));
        self.strategy.connect();
    }

    /// Re-bind a previously-detached mapper without resetting job
    /// history or strategy state.
    pub fn reuse_for(&mut self, session: &Arc<dyn MinerSession>, _request: &LoginRequest) {
        self.idle_ticks = 0;
        session.set_mapper_id(self.id);
        self.session = Some(Arc::downgrade(session));
    }

    /// Clear the session reference. The upstream connection stays
    /// alive; the mapper becomes eligible for reuse or idle cleanup.
    pub fn detach(&mut self) {
        self.session = None;
        self.dirty = true;
    }

    /// Swap the pool list under the mapper without dropping traffic:
    /// the new strategy connects in the background and is promoted only
    /// once it reports a live connection.
    pub fn reload_pools(&mut self, pools: &[PoolConfig]) {
        if let Pending::Connecting(mut old) = std::mem::replace(&mut self.pending, Pending::None) {
            old.stop();
        }

        let mut pending = strategy::create(pools, &self.config.retry, &self.links);
        pending.connect();
        self.pending = Pending::Connecting(pending);
    }

    /// Stop both strategies; the mapper is unusable afterwards.
    pub fn stop(&mut self) {
        self.strategy.stop();

        if let Pending::Connecting(pending) = &mut self.pending {
            pending.stop();
        }

        self.active = false;
    }

    /// Validate and route one share. Failures are recorded on the
    /// event; the verdict from upstream arrives later through the
    /// result path.
    pub fn submit(&mut self, event: &mut SubmitEvent) {
        if !self.active {
            return event.reject(ErrorCode::BadGateway);
        }

        if !self.is_valid_job_id(&event.request.job_id) {
            return event.reject(ErrorCode::InvalidJobId);
        }

        let mut request = event.request.clone();
        request.difficulty = self.job.difficulty();

        self.strategy.submit(&request);
    }

    /// Advance strategy timers, apply buffered upstream events, and
    /// count idle time while no session is attached. Called once per
    /// second by the owner.
    pub fn tick(&mut self, _ticks: u64, now: Instant) {
        self.strategy.tick(now);

        if let Pending::Connecting(pending) = &mut self.pending {
            pending.tick(now);
        }

        self.drain_events();

        if !self.has_session() {
            self.idle_ticks += 1;
        }
    }

    fn session(&self) -> Option<Arc<dyn MinerSession>> {
        self.session.as_ref().and_then(Weak::upgrade)
    }

    fn is_valid_job_id(&self, id: &str) -> bool {
        if self.job.is_valid() && self.job.id() == id {
            return true;
        }

        if self.prev_job.is_valid() && self.prev_job.id() == id {
            self.counters
                .expired_accepted
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            metrics::counter!("expired_jobs_accepted_total").increment(1);
            return true;
        }

        false
    }

    fn drain_events(&mut self) {
        while let Some(event) = self.strategy.poll_event() {
            self.apply(Slot::Active, event);
        }

        loop {
            let event = match &mut self.pending {
                Pending::Connecting(pending) => pending.poll_event(),
                Pending::None => None,
            };

            let Some(event) = event else { break };
            self.apply(Slot::Pending, event);
        }

        // a promotion moves the pending queue behind self.strategy
        while let Some(event) = self.strategy.poll_event() {
            self.apply(Slot::Active, event);
        }
    }

    fn apply(&mut self, slot: Slot, event: StrategyEvent) {
        match event {
            StrategyEvent::Active(connection) => self.on_active(slot, connection),
            StrategyEvent::Job(connection, job) => self.on_job(connection, job),
            StrategyEvent::Paused => self.on_pause(slot),
            StrategyEvent::Result {
                connection,
                result,
                error,
            } => self.on_result(connection, result, error),
        }
    }

    fn on_active(&mut self, slot: Slot, connection: ConnectionInfo) {
        self.active = true;

        // synthetic upstreams activate silently and never promote
        if connection.id.is_offline() {
            return;
        }

        if slot == Slot::Pending {
            if let Pending::Connecting(pending) =
                std::mem::replace(&mut self.pending, Pending::None)
            {
                let mut old = std::mem::replace(&mut self.strategy, pending);
                old.stop();
            }
        }

        self.counters
            .pool_switches
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        if self.config.log.verbose {
            if self.config.log.colors {
                info!(
                    "#{:03} \x1b[01;37muse pool \x1b[01;36m{}:{}\x1b[0m",
                    self.id, connection.host, connection.port
                );
            } else {
                info!("#{:03} use pool {}:{}", self.id, connection.host, connection.port);
            }
        }
    }

    fn on_job(&mut self, connection: ConnectionInfo, job: Job) {
        if self.config.log.verbose {
            if self.config.log.colors {
                info!(
                    "#{:03} \x1b[01;35mnew job\x1b[0m from \x1b[01;37m{}:{}\x1b[0m diff \x1b[01;37m{}",
                    self.id,
                    connection.host,
                    connection.port,
                    job.difficulty()
                );
            } else {
                info!(
                    "#{:03} new job from {}:{} diff {}",
                    self.id,
                    connection.host,
                    connection.port,
                    job.difficulty()
                );
            }
        }

        self.set_job(job);
    }

    fn on_pause(&mut self, slot: Slot) {
        if slot == Slot::Active {
            self.active = false;
        }
    }

    fn on_result(&mut self, connection: ConnectionInfo, result: SubmitResult, error: Option<String>) {
        match self.arena.checkout(AcceptEvent::new(
            self.id,
            result.clone(),
            error.clone(),
            connection.id.is_offline(),
        )) {
            Ok(event) => event.record(&self.counters),
            Err(_) => warn!("#{:03} accept event dropped: arena busy", self.id),
        }

        let Some(session) = self.session() else {
            return;
        };

        if !result.fake {
            match &error {
                Some(message) => session.reply_error(result.request_id, message),
                None => session.reply_success(result.request_id, "OK"),
            }
        }

        session.on_pool_result(&connection, &result);
    }

    fn set_job(&mut self, job: Job) {
        if self.job.connection() == job.connection() {
            // rolling one-deep history: shares racing against the job
            // this one supersedes are still honored
            self.prev_job = std::mem::replace(&mut self.job, job);
        } else {
            // a different upstream does not share nonce space with a
            // stale submission
            self.prev_job = Job::default();
            self.job = job;
        }

        self.dirty = false;

        metrics::counter!("jobs_notified_total").increment(1);
        metrics::histogram!("job_difficulty").record(self.job.difficulty() as f64);

        if let Some(session) = self.session() {
            session.set_job(&self.job);
        }
    }
}
