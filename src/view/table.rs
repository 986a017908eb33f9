//! Job table container: list view state plus selection, driven by actions.

use crate::backend::{JobListQuery, JobPage};
use crate::view::filter::{FilterKey, FilterPatch};
use crate::view::selection::{BulkTarget, SelectionCoordinator};
use crate::view::sort::{Sort, VisibleColumns};
use crate::view::state::{JobTab, ListViewState};

#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    SetPage(u32),
    SetLimit(u32),
    SetSort(Sort),
    SetFilters(FilterPatch),
    ClearFilter(FilterKey),
    ResetFilters,
    SetSearch(String),
    SetTab(JobTab),
    SetColumns(VisibleColumns),
    ToggleAll,
    ToggleRow(i64),
    ClearSelection,
}

#[derive(Debug, Clone)]
pub struct JobTable {
    state: ListViewState,
    selection: SelectionCoordinator,
}

impl JobTable {
    pub fn new(state: ListViewState) -> Self {
        let mut selection = SelectionCoordinator::new();
        selection.sync_scope(&state.scope_key());
        JobTable { state, selection }
    }

    pub fn state(&self) -> &ListViewState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    pub fn apply(&mut self, action: TableAction) {
        match action {
            TableAction::SetPage(page) => self.state.set_page(page),
            TableAction::SetLimit(limit) => self.state.set_limit(limit),
            TableAction::SetSort(sort) => self.state.set_sort(sort),
            TableAction::SetFilters(patch) => self.state.set_filters(patch),
            TableAction::ClearFilter(key) => self.state.clear_filter(key),
            TableAction::ResetFilters => self.state.reset_filters(),
            TableAction::SetSearch(text) => self.state.set_search(&text),
            TableAction::SetTab(tab) => self.state.set_tab(tab),
            TableAction::SetColumns(columns) => self.state.set_visible_columns(columns),
            TableAction::ToggleAll => self.selection.toggle_all(),
            TableAction::ToggleRow(id) => self.selection.toggle_row(id),
            TableAction::ClearSelection => self.selection.clear(),
        }
        self.selection.sync_scope(&self.state.scope_key());
    }

    /// Record a page response for the current query
    pub fn load(&mut self, page: &JobPage) {
        self.state.sync_pagination(&page.paginate);
        self.selection.set_loaded(page.ids());
    }

    pub fn query(&self) -> JobListQuery {
        self.state.to_list_query()
    }

    pub fn bulk_target(&self) -> Option<BulkTarget> {
        self.selection.target(&self.query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Paginate;
    use crate::models::fixtures::{job, status};
    use crate::models::SystemType;
    use crate::view::selection::Selection;
    use crate::view::sort::{Column, SortDirection, SortField};

    fn loaded_table(ids: &[i64]) -> JobTable {
        let todo = status(1, "todo", None, Some(2), SystemType::Standard);
        let mut table = JobTable::new(ListViewState::default());
        table.load(&JobPage {
            jobs: ids.iter().map(|id| job(*id, todo.clone())).collect(),
            paginate: Paginate::new(1, 20, 45),
        });
        table
    }

    #[test]
    fn test_load_records_pagination() {
        let mut table = loaded_table(&[1, 2]);
        assert_eq!(table.state().total_pages(), Some(3));
        table.apply(TableAction::SetPage(9));
        assert_eq!(table.state().page(), 3);
    }

    #[test]
    fn test_filter_change_clears_selection() {
        let mut table = loaded_table(&[1, 2, 3]);
        table.apply(TableAction::ToggleRow(2));
        assert!(table.selection().is_selected(2));

        table.apply(TableAction::SetFilters(FilterPatch { paid: Some(true), ..FilterPatch::default() }));
        assert!(table.selection().selection().is_empty());
        assert_eq!(table.bulk_target(), None);
    }

    #[test]
    fn test_scope_change_drops_previous_rows() {
        let mut table = loaded_table(&[1, 2, 3]);
        table.apply(TableAction::SetFilters(FilterPatch { paid: Some(true), ..FilterPatch::default() }));
        table.apply(TableAction::ToggleAll);
        table.apply(TableAction::ToggleRow(2));
        assert_eq!(table.bulk_target(), None);
        assert_eq!(table.state().total_pages(), None);

        // Rows of the new result set are used once it is loaded
        let paid = status(1, "todo", None, Some(2), SystemType::Standard);
        table.load(&JobPage {
            jobs: vec![job(7, paid.clone()), job(8, paid)],
            paginate: Paginate::new(1, 20, 2),
        });
        table.apply(TableAction::ToggleAll);
        table.apply(TableAction::ToggleRow(8));
        assert_eq!(table.bulk_target(), Some(BulkTarget::Ids(vec![7])));
    }

    #[test]
    fn test_column_change_keeps_selection() {
        let mut table = loaded_table(&[1, 2, 3]);
        table.apply(TableAction::ToggleAll);
        table.apply(TableAction::SetColumns(VisibleColumns::Only(vec![Column::Client])));
        assert_eq!(table.selection().selection(), &Selection::All);
    }

    #[test]
    fn test_sort_change_resets_page_and_selection() {
        let mut table = loaded_table(&[1, 2, 3]);
        table.apply(TableAction::SetPage(2));
        table.apply(TableAction::ToggleRow(1));
        table.apply(TableAction::SetSort(Sort::new(SortField::ClientName, SortDirection::Asc)));
        assert_eq!(table.state().page(), 1);
        assert!(table.selection().selection().is_empty());
    }

    #[test]
    fn test_all_target_carries_query() {
        let mut table = loaded_table(&[1, 2, 3]);
        table.apply(TableAction::SetTab(JobTab::Review));
        table.apply(TableAction::ToggleAll);
        match table.bulk_target() {
            Some(BulkTarget::AllMatching(query)) => assert_eq!(query.tab, JobTab::Review),
            other => panic!("unexpected target: {:?}", other),
        }
    }
}
