//! List view state for the job table
//!
//! Every setter keeps the state consistent on its own: anything that changes
//! the result set sends the view back to page 1, a page change touches
//! nothing else.

use crate::backend::{JobListQuery, Paginate};
use crate::config::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MIN_PAGE_LIMIT};
use crate::models::SystemType;
use crate::view::filter::{FilterKey, FilterPatch, FilterState};
use crate::view::sort::{Sort, VisibleColumns};

/// Status tabs above the table, each a slice of the workflow by system type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobTab {
    #[default]
    All,
    Active,
    Review,
    Completed,
    Terminated,
}

impl JobTab {
    pub const ALL: [JobTab; 5] = [
        JobTab::All,
        JobTab::Active,
        JobTab::Review,
        JobTab::Completed,
        JobTab::Terminated,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            JobTab::All => "all",
            JobTab::Active => "active",
            JobTab::Review => "review",
            JobTab::Completed => "completed",
            JobTab::Terminated => "terminated",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }

    /// Active covers work still moving through the workflow, review included
    pub fn admits(&self, system_type: SystemType) -> bool {
        match self {
            JobTab::All => true,
            JobTab::Active => matches!(system_type, SystemType::Standard | SystemType::WaitReview),
            JobTab::Review => system_type == SystemType::WaitReview,
            JobTab::Completed => system_type == SystemType::Completed,
            JobTab::Terminated => system_type == SystemType::Terminated,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListViewState {
    pub(super) page: u32,
    pub(super) limit: u32,
    pub(super) sort: Sort,
    pub(super) search: Option<String>,
    pub(super) tab: JobTab,
    pub(super) filters: FilterState,
    pub(super) visible_columns: VisibleColumns,
    // Transient: never serialized
    search_draft: Option<String>,
    total_pages: Option<u32>,
}

impl Default for ListViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

/// Committed fields only; drafts and known page counts do not make two
/// states different.
impl PartialEq for ListViewState {
    fn eq(&self, other: &Self) -> bool {
        self.page == other.page
            && self.limit == other.limit
            && self.sort == other.sort
            && self.search == other.search
            && self.tab == other.tab
            && self.filters == other.filters
            && self.visible_columns == other.visible_columns
    }
}

impl Eq for ListViewState {}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(MIN_PAGE_LIMIT, MAX_PAGE_LIMIT)
}

impl ListViewState {
    pub fn new(limit: u32) -> Self {
        ListViewState {
            page: 1,
            limit: clamp_limit(limit),
            sort: Sort::default(),
            search: None,
            tab: JobTab::All,
            filters: FilterState::default(),
            visible_columns: VisibleColumns::All,
            search_draft: None,
            total_pages: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn search_draft(&self) -> Option<&str> {
        self.search_draft.as_deref()
    }

    pub fn tab(&self) -> JobTab {
        self.tab
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn visible_columns(&self) -> &VisibleColumns {
        &self.visible_columns
    }

    /// Page count from the last response, if one has been seen
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Move to page `page`, clamped to the known page range
    pub fn set_page(&mut self, page: u32) {
        let mut page = page.max(1);
        if let Some(total) = self.total_pages {
            page = page.min(total.max(1));
        }
        self.page = page;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = clamp_limit(limit);
        self.restart();
    }

    pub fn set_sort(&mut self, sort: Sort) {
        self.sort = sort;
        self.restart();
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.filters.merge(patch);
        self.restart();
    }

    pub fn clear_filter(&mut self, key: FilterKey) {
        self.filters.clear(key);
        self.restart();
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
        self.restart();
    }

    /// Commit a search text; blank text clears the search
    pub fn set_search(&mut self, text: &str) {
        let trimmed = text.trim();
        self.search = if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
        self.search_draft = None;
        self.restart();
    }

    /// Hold search text without touching the result set
    pub fn set_search_draft(&mut self, text: impl Into<String>) {
        self.search_draft = Some(text.into());
    }

    pub fn commit_search(&mut self) {
        let draft = self.search_draft.take().unwrap_or_default();
        self.set_search(&draft);
    }

    pub fn set_tab(&mut self, tab: JobTab) {
        self.tab = tab;
        self.restart();
    }

    pub fn set_visible_columns(&mut self, columns: VisibleColumns) {
        self.visible_columns = columns;
    }

    /// Back to the first page of a new result set; its page count is unknown
    /// until the next response.
    pub(super) fn restart(&mut self) {
        self.page = 1;
        self.total_pages = None;
    }

    /// Record the pagination of a page response
    pub fn sync_pagination(&mut self, paginate: &Paginate) {
        self.total_pages = Some(paginate.total_pages);
    }

    pub fn to_list_query(&self) -> JobListQuery {
        JobListQuery {
            page: self.page,
            limit: self.limit,
            sort: self.sort,
            search: self.search.clone(),
            filters: self.filters.clone(),
            tab: self.tab,
        }
    }
}
