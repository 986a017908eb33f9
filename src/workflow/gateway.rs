//! Status mutation gateway
//!
//! Every job mutation goes through here. The backend enforces the optimistic
//! status check; the gateway applies the permission rules beforehand and
//! keeps the query cache in step afterwards. A failed mutation leaves the
//! cache exactly as it was.

use chrono::NaiveDate;
use crate::backend::{JobBackend, PaymentUpdate, StatusChange};
use crate::cache::QueryCache;
use crate::config::Config;
use crate::error::{JobError, JobResult};
use crate::models::{Job, JobStatus, Role};
use crate::utils::fuzzy::closest_match;
use crate::workflow::resolver::{self, StatusCatalog};

/// Who is acting, and which status staff may deliver to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub role: Role,
    pub delivered_code: String,
}

impl Actor {
    pub fn new(role: Role, delivered_code: impl Into<String>) -> Self {
        Actor { role, delivered_code: delivered_code.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Actor::new(config.role, config.delivered_status.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

pub struct StatusGateway<'a, B: JobBackend + ?Sized> {
    backend: &'a B,
    cache: &'a mut QueryCache,
    actor: &'a Actor,
}

impl<'a, B: JobBackend + ?Sized> StatusGateway<'a, B> {
    pub fn new(backend: &'a B, cache: &'a mut QueryCache, actor: &'a Actor) -> Self {
        StatusGateway { backend, cache, actor }
    }

    pub fn actor(&self) -> &Actor {
        self.actor
    }

    pub fn backend(&self) -> &B {
        self.backend
    }

    /// Send a status change expecting the job to be in `from_code`
    pub fn change_status(&mut self, job_id: i64, from_code: &str, to_code: &str) -> JobResult<Job> {
        let old_status = self.backend.status_by_code(from_code)?;
        let change = StatusChange {
            job_id,
            from_status_code: from_code.to_string(),
            to_status_code: to_code.to_string(),
        };

        match self.backend.change_status(&change) {
            Ok(job) => {
                self.cache.invalidate_status_change(job_id, old_status.as_ref(), &job.status);
                self.cache.put_job(job.clone());
                log::info!("Job {} moved from '{}' to '{}'", job_id, from_code, job.status.code);
                Ok(job)
            }
            Err(e) => {
                log::warn!("Status change on job {} rejected: {}", job_id, e);
                Err(e)
            }
        }
    }

    /// Quick-change targets for a job in its current status
    pub fn quick_targets(&self, job: &Job) -> JobResult<Vec<JobStatus>> {
        resolver::quick_targets(self.backend, &job.status, self.actor.role, &self.actor.delivered_code)
    }

    /// Force-change targets; `Forbidden` for staff
    pub fn force_targets(&self, job: &Job) -> JobResult<Vec<JobStatus>> {
        let catalog = StatusCatalog::new(self.backend.list_statuses()?);
        resolver::force_targets(&job.status, self.actor.role, &catalog)
    }

    fn quick_change_from(&mut self, job: &Job, to_code: &str) -> JobResult<Job> {
        let targets = self.quick_targets(job)?;
        if !targets.iter().any(|s| s.code == to_code) {
            let message = if job.status.is_terminal() {
                format!("'{}' is a terminal status", job.status.code)
            } else if targets.is_empty() {
                format!("no quick change is available from '{}'", job.status.code)
            } else {
                format!(
                    "'{}' is not a quick-change target from '{}' (allowed: {})",
                    to_code,
                    job.status.code,
                    targets.iter().map(|s| s.code.as_str()).collect::<Vec<_>>().join(", ")
                )
            };
            return Err(JobError::validation("status", message));
        }
        self.change_status(job.id, &job.status.code, to_code)
    }

    /// Move a job to an adjacent status
    pub fn quick_change(&mut self, job_id: i64, to_code: &str) -> JobResult<Job> {
        let job = self.backend.get_job(job_id)?;
        self.quick_change_from(&job, to_code)
    }

    /// Move a job one step along the chain
    pub fn quick_step(&mut self, job_id: i64, direction: Direction) -> JobResult<Job> {
        let job = self.backend.get_job(job_id)?;
        let neighbor = match direction {
            Direction::Next => resolver::resolve_next(self.backend, &job.status)?,
            Direction::Prev => resolver::resolve_prev(self.backend, &job.status)?,
        };
        let neighbor = neighbor.ok_or_else(|| {
            let side = match direction {
                Direction::Next => "next",
                Direction::Prev => "previous",
            };
            JobError::validation("status", format!("'{}' has no {} status", job.status.code, side))
        })?;
        self.quick_change_from(&job, &neighbor.code)
    }

    /// Move a job to any status, bypassing adjacency. Admins only.
    pub fn force_change(&mut self, job_id: i64, to_code: &str) -> JobResult<Job> {
        if !self.actor.role.is_admin() {
            log::warn!("Force change on job {} refused for role {}", job_id, self.actor.role.as_str());
            return Err(JobError::Forbidden("force change requires the admin role".to_string()));
        }

        let job = self.backend.get_job(job_id)?;
        if self.backend.status_by_code(to_code)?.is_none() {
            let statuses = self.backend.list_statuses()?;
            return Err(JobError::NotFound {
                entity: "Status",
                key: to_code.to_string(),
                suggestion: closest_match(to_code, statuses.iter().map(|s| s.code.as_str()), 3),
            });
        }
        if job.status.code == to_code {
            return Err(JobError::validation(
                "status",
                format!("job {} is already '{}'", job_id, to_code),
            ));
        }
        self.change_status(job.id, &job.status.code, to_code)
    }

    pub fn mark_paid(&mut self, job_id: i64, is_paid: bool) -> JobResult<Job> {
        let job = self.backend.update_payment(&PaymentUpdate { job_id, is_paid })?;
        self.cache.invalidate_payment(job_id);
        self.cache.put_job(job.clone());
        log::info!("Job {} marked {}", job_id, if is_paid { "paid" } else { "unpaid" });
        Ok(job)
    }

    pub fn reschedule(&mut self, job_id: i64, due_at: Option<NaiveDate>) -> JobResult<Job> {
        let job = self.backend.reschedule(job_id, due_at)?;
        self.refresh_after_edit(&job);
        log::info!("Job {} rescheduled", job_id);
        Ok(job)
    }

    pub fn assign(&mut self, job_id: i64, user_id: i64) -> JobResult<Job> {
        let job = self.backend.assign(job_id, user_id)?;
        self.refresh_after_edit(&job);
        log::info!("Job {} assigned to user {}", job_id, user_id);
        Ok(job)
    }

    fn refresh_after_edit(&mut self, job: &Job) {
        self.cache.invalidate_job(job.id);
        self.cache.invalidate_all_lists();
        self.cache.put_job(job.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{JobListQuery, JobPage, Paginate, SqliteBackend};
    use crate::db::DbConnection;
    use crate::models::NewJob;
    use crate::repo::UserRepo;
    use crate::view::ListViewState;
    use rust_decimal::Decimal;

    fn setup() -> (SqliteBackend, Job) {
        let backend = SqliteBackend::new(DbConnection::connect_in_memory().unwrap());
        let job = backend
            .create_job(&NewJob {
                display_name: "Logo".to_string(),
                client_name: "Acme".to_string(),
                income_cost: Decimal::from(100),
                ..NewJob::default()
            })
            .unwrap();
        (backend, job)
    }

    fn warm(cache: &mut QueryCache, backend: &SqliteBackend, job: &Job) -> JobListQuery {
        let query = ListViewState::default().to_list_query();
        cache.put_list(query.clone(), backend.list_jobs(&query).unwrap());
        cache.put_job(job.clone());
        query
    }

    #[test]
    fn test_conflict_leaves_cache_untouched() {
        let (backend, job) = setup();
        let mut cache = QueryCache::new();
        let query = warm(&mut cache, &backend, &job);
        let admin = Actor::new(Role::Admin, "delivered");

        let mut gateway = StatusGateway::new(&backend, &mut cache, &admin);
        let err = gateway.change_status(job.id, "review", "delivered").unwrap_err();
        assert!(matches!(err, JobError::Conflict { .. }));

        assert_eq!(cache.get_job(job.id), Some(&job));
        assert!(cache.contains_list(&query));
    }

    #[test]
    fn test_successful_change_refreshes_cache() {
        let (backend, job) = setup();
        let mut cache = QueryCache::new();
        let query = warm(&mut cache, &backend, &job);
        let admin = Actor::new(Role::Admin, "delivered");

        let updated = StatusGateway::new(&backend, &mut cache, &admin)
            .quick_step(job.id, Direction::Next)
            .unwrap();
        assert_eq!(updated.status.code, "in_progress");
        assert_eq!(cache.get_job(job.id).map(|j| j.status.code.as_str()), Some("in_progress"));
        assert!(!cache.contains_list(&query));
    }

    #[test]
    fn test_staff_may_only_deliver() {
        let (backend, job) = setup();
        let mut cache = QueryCache::new();
        let admin = Actor::new(Role::Admin, "delivered");
        let staff = Actor::new(Role::Staff, "delivered");

        let err = StatusGateway::new(&backend, &mut cache, &staff)
            .quick_change(job.id, "in_progress")
            .unwrap_err();
        assert!(matches!(err, JobError::Validation { .. }));

        StatusGateway::new(&backend, &mut cache, &admin).force_change(job.id, "review").unwrap();
        let delivered = StatusGateway::new(&backend, &mut cache, &staff)
            .quick_change(job.id, "delivered")
            .unwrap();
        assert_eq!(delivered.status.code, "delivered");
        assert!(delivered.completed_at.is_some());
    }

    #[test]
    fn test_terminal_status_has_no_quick_change() {
        let (backend, job) = setup();
        let mut cache = QueryCache::new();
        let admin = Actor::new(Role::Admin, "delivered");
        let mut gateway = StatusGateway::new(&backend, &mut cache, &admin);

        let cancelled = gateway.force_change(job.id, "cancelled").unwrap();
        assert!(cancelled.finished_at.is_some());
        assert!(gateway.quick_targets(&cancelled).unwrap().is_empty());
        assert!(matches!(gateway.quick_step(job.id, Direction::Prev), Err(JobError::Validation { .. })));
    }

    #[test]
    fn test_force_change_rules() {
        let (backend, job) = setup();
        let mut cache = QueryCache::new();
        let staff = Actor::new(Role::Staff, "delivered");
        let admin = Actor::new(Role::Admin, "delivered");

        let err = StatusGateway::new(&backend, &mut cache, &staff).force_change(job.id, "closed").unwrap_err();
        assert!(matches!(err, JobError::Forbidden(_)));

        let mut gateway = StatusGateway::new(&backend, &mut cache, &admin);
        match gateway.force_change(job.id, "clsoed").unwrap_err() {
            JobError::NotFound { suggestion, .. } => assert_eq!(suggestion.as_deref(), Some("closed")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(gateway.force_change(job.id, "todo"), Err(JobError::Validation { .. })));
        assert_eq!(gateway.force_change(job.id, "closed").unwrap().status.code, "closed");
    }

    #[test]
    fn test_mark_paid_keeps_unrelated_lists() {
        let (backend, job) = setup();
        let mut cache = QueryCache::new();
        let showing = warm(&mut cache, &backend, &job);
        let mut elsewhere = ListViewState::default().to_list_query();
        elsewhere.search = Some("globex".to_string());
        cache.put_list(
            elsewhere.clone(),
            JobPage { jobs: vec![], paginate: Paginate::new(1, 20, 0) },
        );
        let staff = Actor::new(Role::Staff, "delivered");

        let paid = StatusGateway::new(&backend, &mut cache, &staff).mark_paid(job.id, true).unwrap();
        assert!(paid.is_paid);
        assert!(!cache.contains_list(&showing));
        assert!(cache.contains_list(&elsewhere));
    }

    #[test]
    fn test_assign_drops_all_lists() {
        let (backend, job) = setup();
        let mut cache = QueryCache::new();
        warm(&mut cache, &backend, &job);
        let ana = UserRepo::create(backend.conn(), "ana").unwrap();
        let staff = Actor::new(Role::Staff, "delivered");

        StatusGateway::new(&backend, &mut cache, &staff).assign(job.id, ana.id).unwrap();
        assert_eq!(cache.list_count(), 0);
        assert_eq!(cache.get_job(job.id).map(|j| j.assignees.len()), Some(1));
    }
}
