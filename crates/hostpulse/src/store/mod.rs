/// Result store abstraction
///
/// Probe records are append-only: the engine needs exactly two operations,
/// appending one immutable record and reading the most recent record for a
/// host. Retention and expiry are store policy, outside the engine.
pub mod libsql;
pub mod migrations;

use anyhow::Result;
use async_trait::async_trait;

use crate::pool::LibsqlPool;
use crate::types::ProbeRecord;

pub use libsql::LibsqlStore;

/// Store trait exposed to the scheduler and the query path
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Append one immutable probe record
    async fn put(&self, record: &ProbeRecord) -> Result<()>;

    /// The record with the greatest timestamp for this hostname, if any.
    /// Identical timestamps resolve to the later insert.
    async fn latest(&self, hostname: &str) -> Result<Option<ProbeRecord>>;
}

/// Initialize the schema. The daemon runs this once at startup; the API
/// binary only reads and must not.
pub async fn initialize(pool: &LibsqlPool) -> Result<()> {
    let conn = pool.get().await?;
    migrations::run_migrations(&conn).await
}
