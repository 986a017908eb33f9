//! Query cache shared by list/detail reads and mutations
//!
//! Entries are keyed by job id and by the full list query. Mutations drop
//! exactly the entries their change can affect; everything else stays warm.

use std::collections::HashMap;
use crate::backend::{JobListQuery, JobPage};
use crate::models::{Job, JobStatus};

#[derive(Debug, Default)]
pub struct QueryCache {
    jobs: HashMap<i64, Job>,
    lists: HashMap<JobListQuery, JobPage>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_job(&self, job_id: i64) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    pub fn put_job(&mut self, job: Job) {
        self.jobs.insert(job.id, job);
    }

    pub fn get_list(&self, query: &JobListQuery) -> Option<&JobPage> {
        self.lists.get(query)
    }

    pub fn put_list(&mut self, query: JobListQuery, page: JobPage) {
        self.lists.insert(query, page);
    }

    pub fn contains_list(&self, query: &JobListQuery) -> bool {
        self.lists.contains_key(query)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    pub fn invalidate_job(&mut self, job_id: i64) {
        self.jobs.remove(&job_id);
    }

    /// A job moved from `old` to `new`: drop its detail entry and every list
    /// whose query admits either status.
    pub fn invalidate_status_change(&mut self, job_id: i64, old: Option<&JobStatus>, new: &JobStatus) {
        self.invalidate_job(job_id);
        let before = self.lists.len();
        self.lists.retain(|query, _| {
            let admits_old = old.map_or(false, |s| query.admits_status(s));
            !(admits_old || query.admits_status(new))
        });
        log::debug!(
            "Status change on job {} dropped {} cached list(s)",
            job_id,
            before - self.lists.len()
        );
    }

    /// A job's paid flag changed: drop its detail entry, lists showing it,
    /// and lists filtering on the paid flag.
    pub fn invalidate_payment(&mut self, job_id: i64) {
        self.invalidate_job(job_id);
        self.lists
            .retain(|query, page| !(page.contains(job_id) || query.filters.paid.is_some()));
    }

    pub fn invalidate_all_lists(&mut self) {
        self.lists.clear();
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.lists.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Paginate;
    use crate::models::fixtures::{job, status};
    use crate::models::SystemType;
    use crate::view::{FilterState, JobTab, Sort};

    fn query(statuses: &[&str], tab: JobTab) -> JobListQuery {
        JobListQuery {
            page: 1,
            limit: 20,
            sort: Sort::default(),
            search: None,
            filters: FilterState {
                statuses: statuses.iter().map(|s| s.to_string()).collect(),
                ..FilterState::default()
            },
            tab,
        }
    }

    fn page(jobs: Vec<Job>) -> JobPage {
        let total = jobs.len() as u64;
        JobPage { jobs, paginate: Paginate::new(1, 20, total) }
    }

    #[test]
    fn test_status_change_drops_only_affected_lists() {
        let todo = status(1, "todo", None, Some(2), SystemType::Standard);
        let doing = status(2, "in_progress", Some(1), Some(3), SystemType::Standard);

        let mut cache = QueryCache::new();
        cache.put_job(job(1, todo.clone()));
        cache.put_list(query(&[], JobTab::All), page(vec![]));
        cache.put_list(query(&["todo"], JobTab::All), page(vec![]));
        cache.put_list(query(&["in_progress"], JobTab::All), page(vec![]));
        cache.put_list(query(&["review"], JobTab::All), page(vec![]));
        cache.put_list(query(&[], JobTab::Terminated), page(vec![]));

        cache.invalidate_status_change(1, Some(&todo), &doing);

        assert!(cache.get_job(1).is_none());
        assert!(!cache.contains_list(&query(&[], JobTab::All)));
        assert!(!cache.contains_list(&query(&["todo"], JobTab::All)));
        assert!(!cache.contains_list(&query(&["in_progress"], JobTab::All)));
        assert!(cache.contains_list(&query(&["review"], JobTab::All)));
        assert!(cache.contains_list(&query(&[], JobTab::Terminated)));
    }

    #[test]
    fn test_payment_drops_lists_showing_job_or_filtering_paid() {
        let todo = status(1, "todo", None, None, SystemType::Standard);
        let mut paid_filter = query(&[], JobTab::Review);
        paid_filter.filters.paid = Some(true);

        let mut cache = QueryCache::new();
        cache.put_list(query(&[], JobTab::All), page(vec![job(1, todo.clone())]));
        cache.put_list(query(&["todo"], JobTab::All), page(vec![job(2, todo)]));
        cache.put_list(paid_filter.clone(), page(vec![]));

        cache.invalidate_payment(1);

        assert!(!cache.contains_list(&query(&[], JobTab::All)));
        assert!(cache.contains_list(&query(&["todo"], JobTab::All)));
        assert!(!cache.contains_list(&paid_filter));
    }
}
