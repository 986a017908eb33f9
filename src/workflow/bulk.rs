//! Bulk actions over a table selection
//!
//! A target is expanded to concrete job ids first, then the action is applied
//! job by job through the gateway. Failures are collected per job and never
//! stop the remaining jobs.

use crate::backend::JobBackend;
use crate::config::MAX_PAGE_LIMIT;
use crate::error::{JobError, JobResult};
use crate::view::BulkTarget;
use crate::workflow::gateway::StatusGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    /// Move to a status: force change for admins, quick change for staff
    Status(String),
    Paid(bool),
    Assign(i64),
}

#[derive(Debug, Default, PartialEq)]
pub struct BulkReport {
    pub succeeded: Vec<i64>,
    /// Jobs already in the requested status
    pub unchanged: Vec<i64>,
    pub failed: Vec<(i64, JobError)>,
}

impl BulkReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.unchanged.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct BulkExecutor<'a, B: JobBackend + ?Sized> {
    gateway: StatusGateway<'a, B>,
}

impl<'a, B: JobBackend + ?Sized> BulkExecutor<'a, B> {
    pub fn new(gateway: StatusGateway<'a, B>) -> Self {
        BulkExecutor { gateway }
    }

    /// Concrete job ids behind a target. `AllMatching` is paged through the
    /// backend from the first page.
    pub fn expand(&self, target: &BulkTarget) -> JobResult<Vec<i64>> {
        match target {
            BulkTarget::Ids(ids) => Ok(ids.clone()),
            BulkTarget::AllMatching(query) => {
                let mut query = query.clone();
                query.limit = MAX_PAGE_LIMIT;
                query.page = 1;

                let mut ids = Vec::new();
                loop {
                    let page = self.gateway.backend().list_jobs(&query)?;
                    ids.extend(page.ids());
                    if query.page >= page.paginate.total_pages {
                        break;
                    }
                    query.page += 1;
                }
                log::debug!("Bulk target expanded to {} job(s)", ids.len());
                Ok(ids)
            }
        }
    }

    /// Apply `action` to each job in `ids`
    pub fn apply(&mut self, ids: &[i64], action: &BulkAction) -> BulkReport {
        let mut report = BulkReport::default();
        for &job_id in ids {
            match self.apply_one(job_id, action) {
                Ok(true) => report.succeeded.push(job_id),
                Ok(false) => report.unchanged.push(job_id),
                Err(e) => report.failed.push((job_id, e)),
            }
        }
        log::info!(
            "Bulk action applied: {} succeeded, {} unchanged, {} failed",
            report.succeeded.len(),
            report.unchanged.len(),
            report.failed.len()
        );
        report
    }

    pub fn execute(&mut self, target: &BulkTarget, action: &BulkAction) -> JobResult<BulkReport> {
        let ids = self.expand(target)?;
        Ok(self.apply(&ids, action))
    }

    fn apply_one(&mut self, job_id: i64, action: &BulkAction) -> JobResult<bool> {
        match action {
            BulkAction::Status(code) => {
                let job = self.gateway.backend().get_job(job_id)?;
                if job.status.code == *code {
                    return Ok(false);
                }
                if self.gateway.actor().role.is_admin() {
                    self.gateway.force_change(job_id, code)?;
                } else {
                    self.gateway.quick_change(job_id, code)?;
                }
            }
            BulkAction::Paid(is_paid) => {
                self.gateway.mark_paid(job_id, *is_paid)?;
            }
            BulkAction::Assign(user_id) => {
                self.gateway.assign(job_id, *user_id)?;
            }
        }
        Ok(true)
    }
}
