use rusqlite::{Connection, OptionalExtension, Row};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use crate::models::{job_number_for, Job, JobStatus, NewJob};
use crate::repo::{StatusRepo, UserRepo};
use anyhow::{Context, Result};

const JOB_SELECT: &str =
    "SELECT j.id, j.uuid, j.display_name, j.job_number, j.client_name, j.income_cost,
            j.staff_cost, j.payment_channel_id, j.is_paid, j.job_type, j.due_at,
            j.started_at, j.completed_at, j.finished_at, j.created_ts, j.modified_ts,
            s.id, s.code, s.name, s.color, s.sort_order, s.prev_order, s.next_order, s.system_type
     FROM jobs j JOIN job_statuses s ON s.id = j.status_id";

/// Column index where the joined status starts
const STATUS_OFFSET: usize = 16;

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, message.into())
}

fn decimal_at(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| conversion_error(idx, format!("bad amount '{}': {}", raw, e)))
}

fn date_at(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| conversion_error(idx, format!("bad date '{}': {}", s, e)))
    })
    .transpose()
}

fn date_param(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Job repository for database operations
pub struct JobRepo;

impl JobRepo {
    /// Map the job columns; assignees and attachments are loaded separately
    fn from_row(row: &Row) -> rusqlite::Result<Job> {
        Ok(Job {
            id: row.get(0)?,
            uuid: row.get(1)?,
            display_name: row.get(2)?,
            job_number: row.get(3)?,
            client_name: row.get(4)?,
            income_cost: decimal_at(row, 5)?,
            staff_cost: decimal_at(row, 6)?,
            payment_channel_id: row.get(7)?,
            is_paid: row.get::<_, i64>(8)? != 0,
            job_type: row.get(9)?,
            due_at: date_at(row, 10)?,
            started_at: date_at(row, 11)?,
            completed_at: date_at(row, 12)?,
            finished_at: date_at(row, 13)?,
            created_ts: row.get(14)?,
            modified_ts: row.get(15)?,
            status: StatusRepo::from_row(row, STATUS_OFFSET)?,
            assignees: Vec::new(),
            attachments: Vec::new(),
        })
    }

    fn load_relations(conn: &Connection, job: &mut Job) -> Result<()> {
        job.assignees = UserRepo::list_for_job(conn, job.id)?;
        job.attachments = Self::get_attachments(conn, job.id)?;
        Ok(())
    }

    /// Create a new job in the given initial status
    pub fn create(conn: &Connection, new_job: &NewJob, status: &JobStatus) -> Result<Job> {
        let now = chrono::Utc::now().timestamp();
        let uuid = uuid::Uuid::new_v4().to_string();

        // The generated number needs the row id, so the uuid holds the slot until then
        let provisional_number = new_job.job_number.clone().unwrap_or_else(|| uuid.clone());

        conn.execute(
            "INSERT INTO jobs (uuid, display_name, job_number, client_name, income_cost, staff_cost,
                    payment_channel_id, is_paid, job_type, due_at, status_id, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                uuid,
                new_job.display_name,
                provisional_number,
                new_job.client_name,
                new_job.income_cost.to_string(),
                new_job.staff_cost.to_string(),
                new_job.payment_channel_id,
                new_job.job_type,
                date_param(new_job.due_at),
                status.id,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create job: {}", new_job.display_name))?;

        let id = conn.last_insert_rowid();

        if new_job.job_number.is_none() {
            conn.execute(
                "UPDATE jobs SET job_number = ?1 WHERE id = ?2",
                rusqlite::params![job_number_for(id), id],
            )?;
        }

        for user_id in &new_job.assignee_ids {
            Self::add_assignee(conn, id, *user_id)?;
        }
        for url in &new_job.attachments {
            conn.execute(
                "INSERT INTO job_attachments (job_id, url) VALUES (?1, ?2)",
                rusqlite::params![id, url],
            )?;
        }

        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Job {} vanished after insert", id))
    }

    pub fn number_exists(conn: &Connection, job_number: &str) -> Result<bool> {
        let found = conn
            .query_row("SELECT 1 FROM jobs WHERE job_number = ?1", [job_number], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Get job by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Job>> {
        let mut stmt = conn.prepare(&format!("{} WHERE j.id = ?1", JOB_SELECT))?;
        let job = stmt.query_row([id], Self::from_row).optional()?;

        match job {
            Some(mut job) => {
                Self::load_relations(conn, &mut job)?;
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }

    /// List all jobs by id
    pub fn list_all(conn: &Connection) -> Result<Vec<Job>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY j.id", JOB_SELECT))?;
        let rows = stmt.query_map([], Self::from_row)?;

        let mut jobs = Vec::new();
        for row in rows {
            let mut job = row?;
            Self::load_relations(conn, &mut job)?;
            jobs.push(job);
        }
        Ok(jobs)
    }

    pub fn get_attachments(conn: &Connection, job_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare("SELECT url FROM job_attachments WHERE job_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map([job_id], |row| row.get::<_, String>(0))?;
        let mut urls = Vec::new();
        for row in rows {
            urls.push(row?);
        }
        Ok(urls)
    }

    /// Move a job to a status and write its date stamps
    pub fn update_status(
        conn: &Connection,
        job_id: i64,
        status: &JobStatus,
        started_at: Option<NaiveDate>,
        completed_at: Option<NaiveDate>,
        finished_at: Option<NaiveDate>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn
            .execute(
                "UPDATE jobs SET status_id = ?1, started_at = ?2, completed_at = ?3, finished_at = ?4,
                        modified_ts = ?5
                 WHERE id = ?6",
                rusqlite::params![
                    status.id,
                    date_param(started_at),
                    date_param(completed_at),
                    date_param(finished_at),
                    now,
                    job_id
                ],
            )
            .with_context(|| format!("Failed to update status of job {}", job_id))?;
        if updated == 0 {
            anyhow::bail!("No job found with id={}", job_id);
        }
        Ok(())
    }

    pub fn set_paid(conn: &Connection, job_id: i64, is_paid: bool) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn
            .execute(
                "UPDATE jobs SET is_paid = ?1, modified_ts = ?2 WHERE id = ?3",
                rusqlite::params![is_paid as i64, now, job_id],
            )
            .with_context(|| format!("Failed to update payment of job {}", job_id))?;
        if updated == 0 {
            anyhow::bail!("No job found with id={}", job_id);
        }
        Ok(())
    }

    pub fn set_due(conn: &Connection, job_id: i64, due_at: Option<NaiveDate>) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn
            .execute(
                "UPDATE jobs SET due_at = ?1, modified_ts = ?2 WHERE id = ?3",
                rusqlite::params![date_param(due_at), now, job_id],
            )
            .with_context(|| format!("Failed to reschedule job {}", job_id))?;
        if updated == 0 {
            anyhow::bail!("No job found with id={}", job_id);
        }
        Ok(())
    }

    /// Assign a user; assigning twice is a no-op
    pub fn add_assignee(conn: &Connection, job_id: i64, user_id: i64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO job_assignees (job_id, user_id) VALUES (?1, ?2)",
            rusqlite::params![job_id, user_id],
        )
        .with_context(|| format!("Failed to assign user {} to job {}", user_id, job_id))?;
        conn.execute(
            "UPDATE jobs SET modified_ts = ?1 WHERE id = ?2",
            rusqlite::params![chrono::Utc::now().timestamp(), job_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::repo::ChannelRepo;

    fn new_job(name: &str) -> NewJob {
        NewJob {
            display_name: name.to_string(),
            client_name: "Acme".to_string(),
            income_cost: Decimal::from_str("1200.50").unwrap(),
            staff_cost: Decimal::from_str("300").unwrap(),
            ..NewJob::default()
        }
    }

    #[test]
    fn test_create_generates_number() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let todo = StatusRepo::first(&conn).unwrap().unwrap();
        let job = JobRepo::create(&conn, &new_job("Logo"), &todo).unwrap();
        assert_eq!(job.job_number, "J-00001");
        assert_eq!(job.status.code, "todo");
        assert_eq!(job.income_cost.to_string(), "1200.50");
        assert!(!job.is_paid);
    }

    #[test]
    fn test_number_exists() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let todo = StatusRepo::first(&conn).unwrap().unwrap();
        JobRepo::create(&conn, &new_job("Logo"), &todo).unwrap();
        assert!(JobRepo::number_exists(&conn, "J-00001").unwrap());
        assert!(!JobRepo::number_exists(&conn, "J-00002").unwrap());
    }

    #[test]
    fn test_create_with_relations() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let todo = StatusRepo::first(&conn).unwrap().unwrap();
        let ana = UserRepo::create(&conn, "ana").unwrap();
        let bank = ChannelRepo::create(&conn, "bank").unwrap();
        let mut draft = new_job("Site");
        draft.job_number = Some("WEB-7".to_string());
        draft.payment_channel_id = Some(bank.id);
        draft.assignee_ids = vec![ana.id];
        draft.attachments = vec!["https://files.example/brief.pdf".to_string()];
        draft.due_at = NaiveDate::from_ymd_opt(2026, 5, 1);

        let job = JobRepo::create(&conn, &draft, &todo).unwrap();
        assert_eq!(job.job_number, "WEB-7");
        assert_eq!(job.assignees, vec![ana]);
        assert_eq!(job.attachments, vec!["https://files.example/brief.pdf".to_string()]);
        assert_eq!(job.due_at, NaiveDate::from_ymd_opt(2026, 5, 1));
        assert_eq!(job.payment_channel_id, Some(bank.id));
    }

    #[test]
    fn test_update_status_and_paid() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let todo = StatusRepo::first(&conn).unwrap().unwrap();
        let job = JobRepo::create(&conn, &new_job("Logo"), &todo).unwrap();
        let delivered = StatusRepo::get_by_code(&conn, "delivered").unwrap().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 1);

        JobRepo::update_status(&conn, job.id, &delivered, today, today, None).unwrap();
        JobRepo::set_paid(&conn, job.id, true).unwrap();

        let job = JobRepo::get_by_id(&conn, job.id).unwrap().unwrap();
        assert_eq!(job.status.code, "delivered");
        assert_eq!(job.completed_at, today);
        assert!(job.is_paid);
    }

    #[test]
    fn test_missing_job_updates_fail() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert!(JobRepo::set_paid(&conn, 99, true).is_err());
        assert!(JobRepo::set_due(&conn, 99, None).is_err());
        assert!(JobRepo::get_by_id(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn test_assign_twice_is_noop() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let todo = StatusRepo::first(&conn).unwrap().unwrap();
        let job = JobRepo::create(&conn, &new_job("Logo"), &todo).unwrap();
        let ana = UserRepo::create(&conn, "ana").unwrap();
        JobRepo::add_assignee(&conn, job.id, ana.id).unwrap();
        JobRepo::add_assignee(&conn, job.id, ana.id).unwrap();
        assert_eq!(JobRepo::get_by_id(&conn, job.id).unwrap().unwrap().assignees.len(), 1);
    }
}
