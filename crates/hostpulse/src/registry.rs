//! Host registry and the registration flow.
//!
//! The scheduler only ever reads a snapshot of the registry; writes come
//! through [`register_host`], which gates acceptance on one exploratory
//! probe so unreachable hosts never enter the monitored set.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use libsql::params;
use thiserror::Error;
use tracing::warn;

use crate::pool::{LibsqlManager, LibsqlPool};
use crate::probe::Prober;
use crate::validation::validate_hostname;

/// Why a registration was rejected
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid host: {0}")]
    InvalidHost(String),
    #[error("not reachable")]
    NotReachable,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Registry trait: the set of hosts currently under monitoring
#[async_trait]
pub trait HostRegistry: Send + Sync {
    /// Snapshot of all registered hosts
    async fn list_hosts(&self) -> Result<Vec<String>>;

    /// Add a host. Re-adding an existing host is a no-op.
    async fn add_host(&self, hostname: &str) -> Result<()>;
}

/// libsql-backed registry
pub struct LibsqlRegistry {
    pool: LibsqlPool,
}

impl LibsqlRegistry {
    pub fn new(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl HostRegistry for LibsqlRegistry {
    async fn list_hosts(&self) -> Result<Vec<String>> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare("SELECT hostname FROM hosts ORDER BY id").await?;

        let mut rows = stmt.query(()).await?;
        let mut hosts = Vec::new();

        while let Some(row) = rows.next().await? {
            hosts.push(row.get(0)?);
        }

        Ok(hosts)
    }

    async fn add_host(&self, hostname: &str) -> Result<()> {
        let conn = self.conn().await?;

        conn.execute(
            "INSERT OR IGNORE INTO hosts (hostname, created_at) VALUES (?, ?)",
            params![hostname.to_string(), Utc::now().timestamp_millis()],
        )
        .await?;

        Ok(())
    }
}

/// Register a host for monitoring.
///
/// Validates the identifier, runs one exploratory probe, and only then adds
/// the host. A failed probe rejects the registration; the host starts being
/// monitored from the next scheduler run.
pub async fn register_host(
    registry: &dyn HostRegistry,
    prober: &dyn Prober,
    hostname: &str,
) -> Result<(), RegisterError> {
    let hostname = hostname.trim();

    let validation = validate_hostname(hostname);
    if !validation.is_valid {
        return Err(RegisterError::InvalidHost(
            validation.error.unwrap_or_else(|| "invalid host".to_string()),
        ));
    }

    if let Err(kind) = prober.probe(hostname).await {
        warn!(host = %hostname, kind = %kind, "registration probe failed");
        return Err(RegisterError::NotReachable);
    }

    registry.add_host(hostname).await?;
    Ok(())
}
