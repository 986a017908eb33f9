//! Backend boundary
//!
//! The workflow and view layers talk to job data only through [`JobBackend`].
//! The shipped implementation is [`SqliteBackend`], a local job ledger.

pub mod sqlite;

pub use sqlite::SqliteBackend;

use chrono::NaiveDate;
use serde::Serialize;
use crate::error::JobResult;
use crate::models::{Job, JobStatus};
use crate::view::{FilterState, JobTab, Sort};

/// Job list request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobListQuery {
    pub page: u32,
    pub limit: u32,
    pub sort: Sort,
    pub search: Option<String>,
    pub filters: FilterState,
    pub tab: JobTab,
}

impl JobListQuery {
    /// True when a job in `status` could be listed by this query
    pub fn admits_status(&self, status: &JobStatus) -> bool {
        self.tab.admits(status.system_type) && self.filters.admits_status(&status.code)
    }

    /// Same query positioned on another page
    pub fn with_page(&self, page: u32) -> Self {
        JobListQuery { page, ..self.clone() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paginate {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Paginate {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit as u64) as u32;
        Paginate { page, limit, total, total_pages }
    }
}

/// Job list response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub paginate: Paginate,
}

impl JobPage {
    pub fn contains(&self, job_id: i64) -> bool {
        self.jobs.iter().any(|j| j.id == job_id)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.jobs.iter().map(|j| j.id).collect()
    }
}

/// Status change command; `from_status_code` is the caller's view of the job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub job_id: i64,
    pub from_status_code: String,
    pub to_status_code: String,
}

/// Payment update command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub job_id: i64,
    pub is_paid: bool,
}

/// Status lookups used by the status graph resolver
pub trait StatusLookup {
    /// Status at `order`, first found when orders are duplicated
    fn status_by_order(&self, order: i64) -> JobResult<Option<JobStatus>>;

    fn status_by_code(&self, code: &str) -> JobResult<Option<JobStatus>>;
}

/// Job data service
pub trait JobBackend: StatusLookup {
    fn list_jobs(&self, query: &JobListQuery) -> JobResult<JobPage>;

    /// Fails with `NotFound` when the job does not exist
    fn get_job(&self, job_id: i64) -> JobResult<Job>;

    /// Apply a status change. Fails with `Conflict` when the job's current
    /// status is not `from_status_code`; nothing is written in that case.
    fn change_status(&self, change: &StatusChange) -> JobResult<Job>;

    /// Every status in workflow order
    fn list_statuses(&self) -> JobResult<Vec<JobStatus>>;

    fn update_payment(&self, update: &PaymentUpdate) -> JobResult<Job>;

    fn reschedule(&self, job_id: i64, due_at: Option<NaiveDate>) -> JobResult<Job>;

    fn assign(&self, job_id: i64, user_id: i64) -> JobResult<Job>;
}
