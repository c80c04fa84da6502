//! Integration tests for the probe engine.
//!
//! These tests drive the scheduler, store, and registry together against a
//! temporary database, with probers stubbed out so no network traffic is
//! generated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tempfile::{TempDir, tempdir};

use hostpulse::pool::LibsqlPool;
use hostpulse::registry::{HostRegistry, LibsqlRegistry, RegisterError, register_host};
use hostpulse::scheduler::{Scheduler, SchedulerConfig};
use hostpulse::store::{LibsqlStore, ResultStore};
use hostpulse::types::{ProbeFailure, ProbeRecord};
use hostpulse::{Prober, ProbeConfig, PingProber};

/// Helper to create a test database pool with the schema applied
async fn create_test_pool() -> Result<(LibsqlPool, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");

    let pool = hostpulse::pool::connect(&db_path.to_string_lossy()).await?;
    hostpulse::store::initialize(&pool).await?;

    Ok((pool, temp_dir))
}

/// Prober with a fixed outcome per host
struct MapProber {
    outcomes: HashMap<String, Result<Vec<f64>, ProbeFailure>>,
}

#[async_trait::async_trait]
impl Prober for MapProber {
    async fn probe(&self, host: &str) -> Result<Vec<f64>, ProbeFailure> {
        match self.outcomes.get(host) {
            Some(Ok(samples)) => Ok(samples.clone()),
            Some(Err(kind)) => Err(*kind),
            None => Ok(vec![1.0]),
        }
    }
}

/// Prober that never completes on its own
struct SlowProber {
    delay: Duration,
}

#[async_trait::async_trait]
impl Prober for SlowProber {
    async fn probe(&self, _host: &str) -> Result<Vec<f64>, ProbeFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![1.0])
    }
}

/// Prober that always reports the host unreachable
struct UnreachableProber;

#[async_trait::async_trait]
impl Prober for UnreachableProber {
    async fn probe(&self, _host: &str) -> Result<Vec<f64>, ProbeFailure> {
        Err(ProbeFailure::Unreachable)
    }
}

fn scheduler_with(
    prober: Arc<dyn Prober>,
    pool: &LibsqlPool,
    config: SchedulerConfig,
) -> Scheduler {
    Scheduler::new(
        prober,
        Arc::new(LibsqlStore::new(pool.clone())),
        Arc::new(LibsqlRegistry::new(pool.clone())),
        config,
    )
}

#[tokio::test]
async fn test_fan_out_produces_one_record_per_host() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let registry = LibsqlRegistry::new(pool.clone());
    let store = LibsqlStore::new(pool.clone());

    registry.add_host("up.example").await?;
    registry.add_host("down.example").await?;
    registry.add_host("slow.example").await?;
    registry.add_host("fine.example").await?;

    let mut outcomes: HashMap<String, Result<Vec<f64>, ProbeFailure>> = HashMap::new();
    outcomes.insert("up.example".into(), Ok(vec![10.0, 12.0, 11.0, 9.0, 13.0]));
    outcomes.insert("down.example".into(), Err(ProbeFailure::Unreachable));
    outcomes.insert("slow.example".into(), Err(ProbeFailure::Timeout));
    outcomes.insert("fine.example".into(), Ok(vec![3.0, 3.5]));

    let scheduler =
        scheduler_with(Arc::new(MapProber { outcomes }), &pool, SchedulerConfig::default());

    let summary = scheduler.run_once().await?;
    assert_eq!(summary.hosts, 4);
    assert_eq!(summary.recorded, 4);
    assert_eq!(summary.failed_probes, 2);
    assert_eq!(summary.store_errors, 0);
    assert_eq!(summary.skipped, 0);

    let up = store.latest("up.example").await?.expect("record for up.example");
    assert!(!up.failed);
    assert_eq!(up.rtt, 11.0);
    assert_eq!(up.jitter, 4.0);

    let down = store.latest("down.example").await?.expect("record for down.example");
    assert!(down.failed);
    assert_eq!(down.rtt, 0.0);
    assert_eq!(down.jitter, 0.0);

    let slow = store.latest("slow.example").await?.expect("record for slow.example");
    assert!(slow.failed);

    Ok(())
}

#[tokio::test]
async fn test_slow_probes_do_not_block_the_run() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let registry = LibsqlRegistry::new(pool.clone());
    let store = LibsqlStore::new(pool.clone());

    for host in ["one.example", "two.example", "three.example"] {
        registry.add_host(host).await?;
    }

    let config = SchedulerConfig {
        probe_timeout: Duration::from_millis(250),
        ..SchedulerConfig::default()
    };
    let scheduler =
        scheduler_with(Arc::new(SlowProber { delay: Duration::from_secs(30) }), &pool, config);

    let started = Instant::now();
    let summary = scheduler.run_once().await?;

    // Bounded by the max of the per-probe timeouts, not their sum
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(summary.recorded, 3);
    assert_eq!(summary.failed_probes, 3);

    for host in ["one.example", "two.example", "three.example"] {
        let record = store.latest(host).await?.expect("timed-out probe still records");
        assert!(record.failed);
        assert_eq!(record.rtt, 0.0);
    }

    Ok(())
}

#[tokio::test]
async fn test_latest_returns_max_timestamp() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let store = LibsqlStore::new(pool.clone());

    let base = ProbeRecord::success("host.example", &[5.0]);
    let older = ProbeRecord {
        timestamp: ProbeRecord::millis_to_timestamp(base.timestamp_millis() - 10_000),
        rtt: 1.0,
        ..base.clone()
    };
    let newer = ProbeRecord {
        timestamp: ProbeRecord::millis_to_timestamp(base.timestamp_millis() + 10_000),
        rtt: 9.0,
        ..base.clone()
    };

    // Insert out of order
    store.put(&newer).await?;
    store.put(&older).await?;
    store.put(&base).await?;

    let latest = store.latest("host.example").await?.expect("record");
    assert_eq!(latest.rtt, 9.0);
    assert_eq!(latest.timestamp_millis(), newer.timestamp_millis());

    Ok(())
}

#[tokio::test]
async fn test_latest_tie_breaks_by_insertion_order() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let store = LibsqlStore::new(pool.clone());

    let first = ProbeRecord::success("tied.example", &[1.0]);
    let second = ProbeRecord { rtt: 2.0, ..first.clone() };

    store.put(&first).await?;
    store.put(&second).await?;

    // Identical timestamps resolve to the later insert
    let latest = store.latest("tied.example").await?.expect("record");
    assert_eq!(latest.rtt, 2.0);

    Ok(())
}

#[tokio::test]
async fn test_latest_is_idempotent_and_unknown_host_is_none() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let store = LibsqlStore::new(pool.clone());

    assert!(store.latest("unknown.example").await?.is_none());

    store.put(&ProbeRecord::success("known.example", &[4.0, 6.0])).await?;

    let first = store.latest("known.example").await?;
    let second = store.latest("known.example").await?;
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn test_registration_rejects_unreachable_host() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let registry = LibsqlRegistry::new(pool.clone());

    let result = register_host(&registry, &UnreachableProber, "dead.example").await;
    assert!(matches!(result, Err(RegisterError::NotReachable)));

    // Rejected hosts never enter the monitored set
    assert!(registry.list_hosts().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_registration_rejects_invalid_host_before_probing() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let registry = LibsqlRegistry::new(pool.clone());

    let result = register_host(&registry, &UnreachableProber, "bad host").await;
    assert!(matches!(result, Err(RegisterError::InvalidHost(_))));

    let result = register_host(&registry, &UnreachableProber, "").await;
    assert!(matches!(result, Err(RegisterError::InvalidHost(_))));

    assert!(registry.list_hosts().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_registration_adds_reachable_host() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let registry = LibsqlRegistry::new(pool.clone());

    let prober = MapProber { outcomes: HashMap::new() };
    register_host(&registry, &prober, "good.example").await.expect("registration succeeds");

    // Idempotent re-registration
    register_host(&registry, &prober, "good.example").await.expect("re-registration succeeds");

    assert_eq!(registry.list_hosts().await?, vec!["good.example".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_overlapping_runs_skip_in_flight_hosts() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let registry = LibsqlRegistry::new(pool.clone());
    registry.add_host("busy.example").await?;

    let config = SchedulerConfig {
        probe_timeout: Duration::from_secs(5),
        ..SchedulerConfig::default()
    };
    let scheduler = Arc::new(scheduler_with(
        Arc::new(SlowProber { delay: Duration::from_millis(800) }),
        &pool,
        config,
    ));

    let background = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run_once().await })
    };

    // Give the first run time to claim the host
    tokio::time::sleep(Duration::from_millis(100)).await;

    let overlapping = scheduler.run_once().await?;
    assert_eq!(overlapping.hosts, 1);
    assert_eq!(overlapping.skipped, 1);
    assert_eq!(overlapping.recorded, 0);

    let first = background.await??;
    assert_eq!(first.recorded, 1);
    assert_eq!(first.skipped, 0);

    Ok(())
}

#[tokio::test]
async fn test_bounded_concurrency_still_probes_every_host() -> Result<()> {
    let (pool, _dir) = create_test_pool().await?;
    let registry = LibsqlRegistry::new(pool.clone());
    let store = LibsqlStore::new(pool.clone());

    for i in 0..8 {
        registry.add_host(&format!("host{i}.example")).await?;
    }

    let config = SchedulerConfig { max_concurrent: Some(2), ..SchedulerConfig::default() };
    let scheduler =
        scheduler_with(Arc::new(MapProber { outcomes: HashMap::new() }), &pool, config);

    let summary = scheduler.run_once().await?;
    assert_eq!(summary.recorded, 8);

    for i in 0..8 {
        assert!(store.latest(&format!("host{i}.example")).await?.is_some());
    }

    Ok(())
}

#[tokio::test]
async fn test_ping_prober_default_configuration() {
    // The production prober is exercised end to end by ops tooling; here we
    // only pin down the configured defaults.
    let config = ProbeConfig::default();
    assert_eq!(config.samples, 5);
    assert_eq!(config.interval, Duration::from_millis(200));
    assert_eq!(config.timeout, Duration::from_secs(5));
    let _prober = PingProber::new(config);
}
