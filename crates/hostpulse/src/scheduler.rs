//! Periodic fan-out scheduler.
//!
//! On each tick the scheduler snapshots the registry, dispatches one probe
//! per host, classifies each outcome as it completes, and persists one
//! record per host. Probes run as independent tasks: one slow or dead host
//! never delays persistence of another host's result.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout};
use tracing::{debug, error, info};

use crate::probe::Prober;
use crate::registry::HostRegistry;
use crate::store::ResultStore;
use crate::types::ProbeRecord;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Trigger period between runs
    pub period: Duration,
    /// Hard per-probe deadline, enforced even against a misbehaving prober
    pub probe_timeout: Duration,
    /// Probes in flight at once per run. `None` is unbounded, which is the
    /// observed baseline but a scalability hazard against large host sets.
    pub max_concurrent: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(3),
            probe_timeout: Duration::from_secs(5),
            max_concurrent: None,
        }
    }
}

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Hosts in the registry snapshot
    pub hosts: usize,
    /// Hosts skipped because a probe from an overlapping run is in flight
    pub skipped: usize,
    /// Records persisted (success and failure alike)
    pub recorded: usize,
    /// Probes classified as failed
    pub failed_probes: usize,
    /// Records lost to store errors
    pub store_errors: usize,
}

/// Fan-out scheduler over a prober, a store, and a registry
pub struct Scheduler {
    prober: Arc<dyn Prober>,
    store: Arc<dyn ResultStore>,
    registry: Arc<dyn HostRegistry>,
    config: SchedulerConfig,
    limiter: Option<Arc<Semaphore>>,
    // Hosts with a probe in flight, shared across overlapping runs so the
    // same host is never probed twice concurrently.
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Scheduler {
    pub fn new(
        prober: Arc<dyn Prober>,
        store: Arc<dyn ResultStore>,
        registry: Arc<dyn HostRegistry>,
        config: SchedulerConfig,
    ) -> Self {
        let limiter = config.max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1))));
        Self {
            prober,
            store,
            registry,
            config,
            limiter,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Probe every currently registered host once and persist one record
    /// per host. Returns once every dispatched probe has completed or hit
    /// its deadline.
    ///
    /// Only a registry read failure aborts the run; per-probe failures
    /// become records and store failures are logged and counted.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let hosts = self.registry.list_hosts().await?;

        let mut summary = RunSummary { hosts: hosts.len(), ..RunSummary::default() };
        let mut claimed = Vec::new();
        {
            let mut in_flight = self.in_flight.lock().await;
            for host in hosts {
                // Also deduplicates the snapshot itself
                if in_flight.insert(host.clone()) {
                    claimed.push(host);
                } else {
                    summary.skipped += 1;
                }
            }
        }

        let mut handles = Vec::with_capacity(claimed.len());
        for host in claimed {
            handles.push(self.dispatch(host));
        }

        for joined in join_all(handles).await {
            match joined {
                Ok(outcome) => {
                    if outcome.failed {
                        summary.failed_probes += 1;
                    }
                    if outcome.stored {
                        summary.recorded += 1;
                    } else {
                        summary.store_errors += 1;
                    }
                }
                Err(err) => {
                    error!(error = %err, "probe task failed to join");
                    summary.store_errors += 1;
                }
            }
        }

        Ok(summary)
    }

    fn dispatch(&self, host: String) -> JoinHandle<ProbeOutcome> {
        let prober = Arc::clone(&self.prober);
        let store = Arc::clone(&self.store);
        let in_flight = Arc::clone(&self.in_flight);
        let limiter = self.limiter.clone();
        let probe_timeout = self.config.probe_timeout;

        tokio::spawn(async move {
            let _permit = match &limiter {
                Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                None => None,
            };

            let record = match timeout(probe_timeout, prober.probe(&host)).await {
                Ok(Ok(samples)) => ProbeRecord::success(host.as_str(), &samples),
                Ok(Err(kind)) => {
                    debug!(host = %host, kind = %kind, "probe failed");
                    ProbeRecord::failure(host.as_str())
                }
                Err(_elapsed) => {
                    debug!(host = %host, "probe exceeded hard timeout");
                    ProbeRecord::failure(host.as_str())
                }
            };

            let stored = match store.put(&record).await {
                Ok(()) => true,
                Err(err) => {
                    error!(host = %host, error = %err, "failed to persist probe record");
                    false
                }
            };

            in_flight.lock().await.remove(&host);

            ProbeOutcome { failed: record.failed, stored }
        })
    }

    /// Start the periodic trigger. Each tick spawns a run without awaiting
    /// the previous one: overlap is allowed, and the in-flight set keeps
    /// overlapping runs from probing the same host concurrently.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = interval(self.config.period);

            loop {
                timer.tick().await;

                let scheduler = Arc::clone(&self);
                tokio::spawn(async move {
                    match scheduler.run_once().await {
                        Ok(summary) => info!(
                            hosts = summary.hosts,
                            recorded = summary.recorded,
                            failed = summary.failed_probes,
                            skipped = summary.skipped,
                            store_errors = summary.store_errors,
                            "probe run complete"
                        ),
                        Err(err) => error!(error = %err, "probe run aborted"),
                    }
                });
            }
        })
    }
}

struct ProbeOutcome {
    failed: bool,
    stored: bool,
}
