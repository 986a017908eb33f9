use rusqlite::Connection;
use serde::Serialize;
use anyhow::{Context, Result};

/// One applied status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChangeRecord {
    pub job_id: i64,
    pub from_code: String,
    pub to_code: String,
    pub changed_ts: i64,
}

pub struct HistoryRepo;

impl HistoryRepo {
    pub fn record(conn: &Connection, job_id: i64, from_code: &str, to_code: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO job_status_history (job_id, from_code, to_code, changed_ts)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![job_id, from_code, to_code, chrono::Utc::now().timestamp()],
        )
        .with_context(|| format!("Failed to record status change for job {}", job_id))?;
        Ok(())
    }

    /// Changes for a job, oldest first
    pub fn list_for_job(conn: &Connection, job_id: i64) -> Result<Vec<StatusChangeRecord>> {
        let mut stmt = conn.prepare(
            "SELECT job_id, from_code, to_code, changed_ts FROM job_status_history
             WHERE job_id = ?1 ORDER BY changed_ts, id",
        )?;
        let rows = stmt.query_map([job_id], |row| {
            Ok(StatusChangeRecord {
                job_id: row.get(0)?,
                from_code: row.get(1)?,
                to_code: row.get(2)?,
                changed_ts: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
