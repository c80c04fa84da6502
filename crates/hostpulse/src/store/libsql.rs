use anyhow::Result;
use async_trait::async_trait;
use libsql::params;

use super::ResultStore;
use crate::pool::{LibsqlManager, LibsqlPool};
use crate::types::ProbeRecord;

/// libsql-backed result store
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    pub fn new(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl ResultStore for LibsqlStore {
    async fn put(&self, record: &ProbeRecord) -> Result<()> {
        let conn = self.conn().await?;

        // Plain append; concurrent puts from in-flight probes never contend
        // on a read-modify-write.
        conn.execute(
            "INSERT INTO probe_results (hostname, rtt, jitter, failed, timestamp) VALUES (?, ?, ?, ?, ?)",
            params![
                record.hostname.clone(),
                record.rtt,
                record.jitter,
                if record.failed { 1 } else { 0 },
                record.timestamp_millis()
            ],
        )
        .await?;

        Ok(())
    }

    async fn latest(&self, hostname: &str) -> Result<Option<ProbeRecord>> {
        let conn = self.conn().await?;
        let mut stmt = conn
            .prepare(
                "SELECT hostname, rtt, jitter, failed, timestamp FROM probe_results WHERE hostname = ? ORDER BY timestamp DESC, id DESC LIMIT 1",
            )
            .await?;

        let mut rows = stmt.query(params![hostname.to_string()]).await?;

        if let Some(row) = rows.next().await? {
            let timestamp: i64 = row.get(4)?;

            Ok(Some(ProbeRecord {
                hostname: row.get(0)?,
                rtt: row.get::<f64>(1)?,
                jitter: row.get::<f64>(2)?,
                failed: row.get::<i64>(3)? != 0,
                timestamp: ProbeRecord::millis_to_timestamp(timestamp),
            }))
        } else {
            Ok(None)
        }
    }
}
