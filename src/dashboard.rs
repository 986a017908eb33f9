//! Dashboard facade: a backend, the query cache in front of it, and the
//! acting user. Reads go through the cache; mutations borrow it through the
//! gateway.

use crate::backend::{JobBackend, JobListQuery, JobPage};
use crate::cache::QueryCache;
use crate::error::JobResult;
use crate::models::Job;
use crate::workflow::{Actor, BulkExecutor, StatusGateway};

pub struct Dashboard<B: JobBackend> {
    backend: B,
    cache: QueryCache,
    actor: Actor,
}

impl<B: JobBackend> Dashboard<B> {
    pub fn new(backend: B, actor: Actor) -> Self {
        Dashboard {
            backend,
            cache: QueryCache::new(),
            actor,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn list_jobs(&mut self, query: &JobListQuery) -> JobResult<JobPage> {
        if let Some(page) = self.cache.get_list(query) {
            log::debug!("List cache hit (page {})", query.page);
            return Ok(page.clone());
        }
        log::debug!("List cache miss (page {})", query.page);
        let page = self.backend.list_jobs(query)?;
        self.cache.put_list(query.clone(), page.clone());
        Ok(page)
    }

    pub fn get_job(&mut self, job_id: i64) -> JobResult<Job> {
        if let Some(job) = self.cache.get_job(job_id) {
            log::debug!("Job cache hit ({})", job_id);
            return Ok(job.clone());
        }
        log::debug!("Job cache miss ({})", job_id);
        let job = self.backend.get_job(job_id)?;
        self.cache.put_job(job.clone());
        Ok(job)
    }

    pub fn gateway(&mut self) -> StatusGateway<'_, B> {
        StatusGateway::new(&self.backend, &mut self.cache, &self.actor)
    }

    pub fn bulk(&mut self) -> BulkExecutor<'_, B> {
        BulkExecutor::new(self.gateway())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SqliteBackend;
    use crate::db::DbConnection;
    use crate::models::{NewJob, Role};
    use crate::view::{JobTable, ListViewState, TableAction};
    use crate::workflow::BulkAction;

    fn dashboard(role: Role) -> Dashboard<SqliteBackend> {
        let backend = SqliteBackend::new(DbConnection::connect_in_memory().unwrap());
        for name in ["Logo", "Flyer", "Banner"] {
            backend
                .create_job(&NewJob {
                    display_name: name.to_string(),
                    client_name: "Acme".to_string(),
                    ..NewJob::default()
                })
                .unwrap();
        }
        Dashboard::new(backend, Actor::new(role, "delivered"))
    }

    #[test]
    fn test_reads_are_cached_until_mutation() {
        let mut dashboard = dashboard(Role::Admin);
        let query = ListViewState::default().to_list_query();
        let page = dashboard.list_jobs(&query).unwrap();
        assert_eq!(page.paginate.total, 3);
        assert!(dashboard.cache().contains_list(&query));

        let job_id = page.jobs[0].id;
        dashboard.gateway().force_change(job_id, "review").unwrap();
        assert!(!dashboard.cache().contains_list(&query));
        assert_eq!(dashboard.get_job(job_id).unwrap().status.code, "review");
    }

    #[test]
    fn test_table_selection_drives_bulk() {
        let mut dashboard = dashboard(Role::Admin);
        let mut table = JobTable::new(ListViewState::default());
        let page = dashboard.list_jobs(&table.query()).unwrap();
        table.load(&page);

        table.apply(TableAction::ToggleAll);
        table.apply(TableAction::ToggleRow(page.jobs[1].id));
        let target = table.bulk_target().unwrap();

        let report = dashboard.bulk().execute(&target, &BulkAction::Paid(true)).unwrap();
        assert_eq!(report.succeeded.len(), 2);
        assert!(!dashboard.get_job(page.jobs[1].id).unwrap().is_paid);
        assert!(dashboard.get_job(page.jobs[0].id).unwrap().is_paid);
    }
}
