//! Job backend over the local SQLite ledger
//!
//! List queries load the jobs and evaluate filters, search and sort in memory,
//! then slice out the requested page.

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use crate::backend::{JobBackend, JobListQuery, JobPage, Paginate, PaymentUpdate, StatusChange, StatusLookup};
use crate::config::{MAX_PAGE_LIMIT, MIN_PAGE_LIMIT};
use crate::error::{JobError, JobResult};
use crate::models::{is_generated_job_number, is_valid_code, stamp_dates, Job, JobStatus, NewJob};
use crate::repo::{ChannelRepo, HistoryRepo, JobRepo, StatusRepo, UserRepo};
use crate::utils::fuzzy::{closest_match, is_substring_match};

fn store<T>(result: anyhow::Result<T>) -> JobResult<T> {
    result.map_err(JobError::from_store)
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Status by code; NotFound carries the nearest code as a hint
    fn require_status(&self, conn: &Connection, code: &str) -> JobResult<JobStatus> {
        if let Some(status) = store(StatusRepo::get_by_code(conn, code))? {
            return Ok(status);
        }
        let statuses = store(StatusRepo::list_all(conn))?;
        Err(JobError::NotFound {
            entity: "Status",
            key: code.to_string(),
            suggestion: closest_match(code, statuses.iter().map(|s| s.code.as_str()), 3),
        })
    }

    /// Explicit job numbers must be unique and stay out of the generated form
    fn check_job_number(&self, number: &str) -> JobResult<()> {
        if number.trim().is_empty() {
            return Err(JobError::validation("number", "cannot be empty"));
        }
        if is_generated_job_number(number) {
            return Err(JobError::validation(
                "number",
                format!("'{}' is reserved for generated job numbers", number),
            ));
        }
        if store(JobRepo::number_exists(&self.conn, number))? {
            return Err(JobError::validation("number", format!("'{}' is already taken", number)));
        }
        Ok(())
    }

    fn require_job(&self, conn: &Connection, job_id: i64) -> JobResult<Job> {
        store(JobRepo::get_by_id(conn, job_id))?.ok_or_else(|| JobError::not_found("Job", job_id))
    }

    /// Create a job after checking its references
    pub fn create_job(&self, new_job: &NewJob) -> JobResult<Job> {
        if new_job.display_name.trim().is_empty() {
            return Err(JobError::validation("name", "cannot be empty"));
        }
        if new_job.client_name.trim().is_empty() {
            return Err(JobError::validation("client", "cannot be empty"));
        }
        if let Some(number) = &new_job.job_number {
            self.check_job_number(number)?;
        }
        if let Some(job_type) = &new_job.job_type {
            if !is_valid_code(job_type) {
                return Err(JobError::validation(
                    "type",
                    format!("'{}' is not a valid type code; use lowercase letters, digits and underscores", job_type),
                ));
            }
        }

        let status = match &new_job.status_code {
            Some(code) => self.require_status(&self.conn, code)?,
            None => store(StatusRepo::first(&self.conn))?
                .ok_or_else(|| JobError::not_found("Status", "initial"))?,
        };

        if let Some(channel_id) = new_job.payment_channel_id {
            if store(ChannelRepo::get_by_id(&self.conn, channel_id))?.is_none() {
                return Err(JobError::not_found("Payment channel", channel_id));
            }
        }
        for user_id in &new_job.assignee_ids {
            if store(UserRepo::get_by_id(&self.conn, *user_id))?.is_none() {
                return Err(JobError::not_found("User", user_id));
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        let job = store(JobRepo::create(&tx, new_job, &status))?;
        tx.commit()?;

        log::info!("Created job {} ({}) in '{}'", job.id, job.job_number, status.code);
        Ok(job)
    }
}

/// Evaluate a list query over the full job set
pub fn evaluate_query(query: &JobListQuery, jobs: Vec<Job>) -> JobPage {
    let mut matching: Vec<Job> = jobs
        .into_iter()
        .filter(|job| query.tab.admits(job.status.system_type))
        .filter(|job| query.filters.matches(job))
        .filter(|job| match &query.search {
            Some(text) => {
                is_substring_match(&job.display_name, text)
                    || is_substring_match(&job.job_number, text)
                    || is_substring_match(&job.client_name, text)
            }
            None => true,
        })
        .collect();

    matching.sort_by(|a, b| query.sort.compare(a, b));

    let total = matching.len() as u64;
    let limit = query.limit.max(1) as usize;
    let start = (query.page.max(1) as usize - 1).saturating_mul(limit);
    let jobs: Vec<Job> = matching.into_iter().skip(start).take(limit).collect();

    JobPage {
        jobs,
        paginate: Paginate::new(query.page, query.limit, total),
    }
}

impl StatusLookup for SqliteBackend {
    fn status_by_order(&self, order: i64) -> JobResult<Option<JobStatus>> {
        store(StatusRepo::get_by_order(&self.conn, order))
    }

    fn status_by_code(&self, code: &str) -> JobResult<Option<JobStatus>> {
        store(StatusRepo::get_by_code(&self.conn, code))
    }
}

impl JobBackend for SqliteBackend {
    fn list_jobs(&self, query: &JobListQuery) -> JobResult<JobPage> {
        if query.page < 1 {
            return Err(JobError::validation("page", "must be at least 1"));
        }
        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&query.limit) {
            return Err(JobError::validation(
                "limit",
                format!("must be between {} and {}", MIN_PAGE_LIMIT, MAX_PAGE_LIMIT),
            ));
        }

        let jobs = store(JobRepo::list_all(&self.conn))?;
        let page = evaluate_query(query, jobs);
        log::debug!(
            "Listed page {}/{} ({} of {} jobs)",
            page.paginate.page,
            page.paginate.total_pages,
            page.jobs.len(),
            page.paginate.total
        );
        Ok(page)
    }

    fn get_job(&self, job_id: i64) -> JobResult<Job> {
        self.require_job(&self.conn, job_id)
    }

    fn change_status(&self, change: &StatusChange) -> JobResult<Job> {
        let tx = self.conn.unchecked_transaction()?;

        let job = self.require_job(&tx, change.job_id)?;
        if job.status.code != change.from_status_code {
            return Err(JobError::Conflict {
                job_id: job.id,
                expected: change.from_status_code.clone(),
                actual: job.status.code.clone(),
            });
        }

        let target = self.require_status(&tx, &change.to_status_code)?;
        if target.code == job.status.code {
            return Ok(job);
        }

        let (started_at, completed_at, finished_at) =
            stamp_dates(&job, &target, Local::now().date_naive());
        store(JobRepo::update_status(&tx, job.id, &target, started_at, completed_at, finished_at))?;
        store(HistoryRepo::record(&tx, job.id, &job.status.code, &target.code))?;
        tx.commit()?;

        self.require_job(&self.conn, job.id)
    }

    fn list_statuses(&self) -> JobResult<Vec<JobStatus>> {
        store(StatusRepo::list_all(&self.conn))
    }

    fn update_payment(&self, update: &PaymentUpdate) -> JobResult<Job> {
        self.require_job(&self.conn, update.job_id)?;
        store(JobRepo::set_paid(&self.conn, update.job_id, update.is_paid))?;
        self.require_job(&self.conn, update.job_id)
    }

    fn reschedule(&self, job_id: i64, due_at: Option<NaiveDate>) -> JobResult<Job> {
        self.require_job(&self.conn, job_id)?;
        store(JobRepo::set_due(&self.conn, job_id, due_at))?;
        self.require_job(&self.conn, job_id)
    }

    fn assign(&self, job_id: i64, user_id: i64) -> JobResult<Job> {
        self.require_job(&self.conn, job_id)?;
        if store(UserRepo::get_by_id(&self.conn, user_id))?.is_none() {
            return Err(JobError::not_found("User", user_id));
        }
        store(JobRepo::add_assignee(&self.conn, job_id, user_id))?;
        self.require_job(&self.conn, job_id)
    }
}
