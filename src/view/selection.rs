//! Bulk selection over the job table
//!
//! The selection is scoped to one result set. When the scope key changes
//! (filters, search, sort, tab, page or page size) the selection is dropped,
//! so a bulk action can never reach rows the user did not see selected.

use std::collections::BTreeSet;
use crate::backend::JobListQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every job matching the current query, across pages
    All,
    Rows(BTreeSet<i64>),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Rows(BTreeSet::new())
    }
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Rows(rows) if rows.is_empty())
    }

    pub fn contains(&self, job_id: i64) -> bool {
        match self {
            Selection::All => true,
            Selection::Rows(rows) => rows.contains(&job_id),
        }
    }
}

/// What a bulk action applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkTarget {
    AllMatching(JobListQuery),
    Ids(Vec<i64>),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionCoordinator {
    selection: Selection,
    loaded: Vec<i64>,
    scope: Option<String>,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, job_id: i64) -> bool {
        self.selection.contains(job_id)
    }

    /// Number of selected jobs given the query's total match count
    pub fn selected_count(&self, total: u64) -> u64 {
        match &self.selection {
            Selection::All => total,
            Selection::Rows(rows) => rows.len() as u64,
        }
    }

    pub fn toggle_all(&mut self) {
        self.selection = match self.selection {
            Selection::All => Selection::Rows(BTreeSet::new()),
            Selection::Rows(_) => Selection::All,
        };
    }

    /// Toggle one row. Deselecting from `All` keeps the other loaded rows.
    pub fn toggle_row(&mut self, job_id: i64) {
        if let Selection::Rows(rows) = &mut self.selection {
            if !rows.remove(&job_id) {
                rows.insert(job_id);
            }
            return;
        }
        let rows = self.loaded.iter().copied().filter(|id| *id != job_id).collect();
        self.selection = Selection::Rows(rows);
    }

    pub fn clear(&mut self) {
        self.selection = Selection::default();
    }

    /// Rows currently shown in the table
    pub fn set_loaded(&mut self, ids: Vec<i64>) {
        self.loaded = ids;
    }

    /// Adopt `scope_key` as the current result set; returns true when a
    /// previous selection was dropped.
    pub fn sync_scope(&mut self, scope_key: &str) -> bool {
        if self.scope.as_deref() == Some(scope_key) {
            return false;
        }
        let changed = self.scope.is_some();
        self.scope = Some(scope_key.to_string());
        if !changed {
            return false;
        }
        // Rows of the previous result set are no longer on screen
        self.loaded.clear();
        if self.selection.is_empty() {
            return false;
        }
        log::debug!("Result set changed, clearing selection");
        self.clear();
        true
    }

    pub fn target(&self, query: &JobListQuery) -> Option<BulkTarget> {
        match &self.selection {
            Selection::All => Some(BulkTarget::AllMatching(query.with_page(1))),
            Selection::Rows(rows) if rows.is_empty() => None,
            Selection::Rows(rows) => Some(BulkTarget::Ids(rows.iter().copied().collect())),
        }
    }
}
