//! Mapper registry for the one-mapper-per-client model: binds sessions
//! to mappers, reuses still-connected mappers for quickly-reconnecting
//! clients, and reclaims mappers that stay idle too long.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::config::{Config, PoolConfig};
use crate::error::ErrorCode;
use crate::event::{Arena, SubmitEvent};
use crate::mapper::Mapper;
use crate::protocol::LoginRequest;
use crate::services::metrics::Counters;
use crate::session::MinerSession;
use crate::strategy;
use crate::upstream::LinkFactory;

pub struct Splitter {
    config: Arc<Config>,
    links: Arc<dyn LinkFactory>,
    arena: Arc<Arena>,
    counters: Arc<Counters>,
    /// Pool list new mappers connect with; updated by `reload_pools`
    pools: Vec<PoolConfig>,
    mappers: HashMap<u64, Mapper>,
    next_id: u64,
}

impl Splitter {
    pub fn new(config: Arc<Config>, links: Arc<dyn LinkFactory>) -> Self {
        Self {
            pools: config.pools.clone(),
            config,
            links,
            arena: Arc::new(Arena::new()),
            counters: Arc::new(Counters::new()),
            mappers: HashMap::new(),
            next_id: 0,
        }
    }

    /// Shared event arena for the submit/accept path.
    pub fn arena(&self) -> &Arc<Arena> {
        &self.arena
    }

    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    pub fn mapper(&self, id: u64) -> Option<&Mapper> {
        self.mappers.get(&id)
    }

    pub fn mapper_count(&self) -> usize {
        self.mappers.len()
    }

    /// Bind a session: reuse a detached, still-connected mapper when
    /// one exists, otherwise create a fresh one. Returns the mapper id.
    pub fn login(&mut self, session: &Arc<dyn MinerSession>, request: &LoginRequest) -> u64 {
        if let Some(id) = self.reusable_mapper() {
            if let Some(mapper) = self.mappers.get_mut(&id) {
                debug!("#{:03} reused for {}", id, request.user);
                self.counters.mappers_reused.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("mappers_reused_total").increment(1);

                mapper.reuse_for(session, request);
                return id;
            }
        }

        let id = self.next_id;
        self.next_id += 1;

        self.counters.mappers_created.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("mappers_created_total").increment(1);

        let strategy = strategy::create(&self.pools, &self.config.retry, &self.links);
        let mut mapper = Mapper::with_strategy(
            id,
            strategy,
            self.config.clone(),
            self.links.clone(),
            self.arena.clone(),
            self.counters.clone(),
        );
        mapper.attach(session, request);
        self.mappers.insert(id, mapper);

        id
    }

    /// Detach the session from its mapper. The upstream connection
    /// stays alive until the idle sweeper reclaims it.
    pub fn remove(&mut self, mapper_id: u64) {
        if let Some(mapper) = self.mappers.get_mut(&mapper_id) {
            mapper.detach();
        }
    }

    /// Route a share to its mapper. An unknown mapper id fails the
    /// event the same way a dead upstream does.
    pub fn submit(&mut self, mapper_id: u64, event: &mut SubmitEvent) {
        match self.mappers.get_mut(&mapper_id) {
            Some(mapper) => mapper.submit(event),
            None => event.reject(ErrorCode::BadGateway),
        }
    }

    /// Swap the pool list under every mapper; each keeps serving from
    /// its old strategy until the new one connects.
    pub fn reload_pools(&mut self, pools: &[PoolConfig]) {
        self.pools = pools.to_vec();

        for mapper in self.mappers.values_mut() {
            mapper.reload_pools(pools);
        }
    }

    /// Drive every mapper and reclaim the ones idle past the limit.
    /// Called once per second.
    pub fn tick(&mut self, ticks: u64, now: Instant) {
        let idle_limit = self.config.limiter.idle.as_secs();
        let counters = self.counters.clone();

        for mapper in self.mappers.values_mut() {
            mapper.tick(ticks, now);
        }

        self.mappers.retain(|id, mapper| {
            let expired =
                mapper.is_dirty() && !mapper.has_session() && mapper.idle_ticks() > idle_limit;

            if expired {
                debug!("#{:03} released after {} idle ticks", id, mapper.idle_ticks());
                counters.mappers_released.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("mappers_released_total").increment(1);
                mapper.stop();
            }

            !expired
        });
    }

    pub fn stop(&mut self) {
        for mapper in self.mappers.values_mut() {
            mapper.stop();
        }
    }

    fn reusable_mapper(&self) -> Option<u64> {
        self.mappers
            .iter()
            .find(|(_, mapper)| mapper.is_reusable())
            .map(|(id, _)| *id)
    }
}
