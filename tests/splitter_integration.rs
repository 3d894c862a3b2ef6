mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{config, login_request, pool, FakeLinks, FakeSession};
use stratum_mux::config::{Config, LimiterConfig};
use stratum_mux::event::SubmitEvent;
use stratum_mux::protocol::SubmitRequest;
use stratum_mux::session::MinerSession;
use stratum_mux::upstream::LinkFactory;
use stratum_mux::{ErrorCode, Splitter};

fn session() -> (Arc<FakeSession>, Arc<dyn MinerSession>) {
    let session = Arc::new(FakeSession::default());
    let dyn_session: Arc<dyn MinerSession> = session.clone();
    (session, dyn_session)
}

#[test]
fn test_login_attaches_a_fresh_mapper() {
    let fakes = FakeLinks::new();
    let links: Arc<dyn LinkFactory> = fakes.clone();
    let mut splitter = Splitter::new(config(vec![pool("a.pool.example.com", 3333)]), links);

    let (recorder, miner) = session();
    let id = splitter.login(&miner, &login_request("wallet.rig1"));

    assert_eq!(*recorder.mapper_ids.lock().unwrap(), vec![id]);
    assert_eq!(splitter.mapper_count(), 1);
    assert_eq!(fakes.handle("a.pool.example.com:3333").opened(), 1);
    assert_eq!(splitter.counters().snapshot().mappers_created, 1);
}

#[test]
fn test_quick_reconnect_reuses_the_detached_mapper() {
    let fakes = FakeLinks::new();
    let links: Arc<dyn LinkFactory> = fakes.clone();
    let mut splitter = Splitter::new(config(vec![pool("a.pool.example.com", 3333)]), links);
    let t0 = Instant::now();

    let (_, first) = session();
    let id = splitter.login(&first, &login_request("wallet.rig1"));

    fakes.handle("a.pool.example.com:3333").push_connected();
    splitter.tick(0, t0);
    splitter.remove(id);

    let (recorder, second) = session();
    let reused = splitter.login(&second, &login_request("wallet.rig1"));

    assert_eq!(reused, id);
    assert_eq!(*recorder.mapper_ids.lock().unwrap(), vec![id]);
    assert_eq!(splitter.counters().snapshot().mappers_reused, 1);
    // no second upstream handshake happened
    assert_eq!(fakes.link_count("a.pool.example.com:3333"), 1);
    assert_eq!(fakes.handle("a.pool.example.com:3333").opened(), 1);
}

#[test]
fn test_idle_sweeper_reclaims_detached_mappers() {
    let fakes = FakeLinks::new();
    let links: Arc<dyn LinkFactory> = fakes.clone();
    let cfg = Arc::new(Config {
        pools: vec![pool("a.pool.example.com", 3333)],
        retry: Default::default(),
        log: Default::default(),
        limiter: LimiterConfig {
            idle: Duration::from_secs(2),
        },
        donate: Default::default(),
    });
    let mut splitter = Splitter::new(cfg, links);
    let t0 = Instant::now();

    let (_, miner) = session();
    let id = splitter.login(&miner, &login_request("wallet.rig1"));
    fakes.handle("a.pool.example.com:3333").push_connected();
    splitter.tick(0, t0);

    splitter.remove(id);

    for tick in 1..=3 {
        splitter.tick(tick, t0 + Duration::from_secs(tick));
    }

    assert_eq!(splitter.mapper_count(), 0);
    assert_eq!(splitter.counters().snapshot().mappers_released, 1);
    assert_eq!(fakes.handle("a.pool.example.com:3333").closed(), 1);
}

#[test]
fn test_attached_mappers_are_never_reclaimed() {
    let fakes = FakeLinks::new();
    let links: Arc<dyn LinkFactory> = fakes.clone();
    let cfg = Arc::new(Config {
        pools: vec![pool("a.pool.example.com", 3333)],
        retry: Default::default(),
        log: Default::default(),
        limiter: LimiterConfig {
            idle: Duration::from_secs(2),
        },
        donate: Default::default(),
    });
    let mut splitter = Splitter::new(cfg, links);
    let t0 = Instant::now();

    let (_recorder, miner) = session();
    splitter.login(&miner, &login_request("wallet.rig1"));

    for tick in 1..=10 {
        splitter.tick(tick, t0 + Duration::from_secs(tick));
    }

    assert_eq!(splitter.mapper_count(), 1);
    assert_eq!(splitter.counters().snapshot().mappers_released, 0);
}

#[test]
fn test_submit_to_unknown_mapper_is_bad_gateway() {
    let fakes = FakeLinks::new();
    let links: Arc<dyn LinkFactory> = fakes.clone();
    let mut splitter = Splitter::new(config(vec![pool("a.pool.example.com", 3333)]), links);

    let mut event = SubmitEvent::new(SubmitRequest::new(1, "j1", "ff", "00", false));
    splitter.submit(99, &mut event);

    assert_eq!(event.error(), ErrorCode::BadGateway);
}

#[test]
fn test_reload_fans_out_and_applies_to_new_mappers() {
    let fakes = FakeLinks::new();
    let links: Arc<dyn LinkFactory> = fakes.clone();
    let mut splitter = Splitter::new(config(vec![pool("a.pool.example.com", 3333)]), links);

    let (_, first) = session();
    let id = splitter.login(&first, &login_request("wallet.rig1"));

    splitter.reload_pools(&[pool("b.pool.example.com", 3333)]);
    assert!(splitter.mapper(id).unwrap().is_reloading());

    // a later login connects straight to the new list
    let (_, second) = session();
    splitter.login(&second, &login_request("wallet.rig2"));
    assert_eq!(fakes.link_count("b.pool.example.com:3333"), 2);
}
