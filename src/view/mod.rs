// Job table view model: list state, its query string, and bulk selection

pub mod filter;
pub mod query;
pub mod selection;
pub mod sort;
pub mod state;
pub mod table;

pub use filter::{CostRange, DateRange, FilterKey, FilterPatch, FilterState};
pub use query::QUERY_KEYS;
pub use selection::{BulkTarget, Selection, SelectionCoordinator};
pub use sort::{Column, Sort, SortDirection, SortField, VisibleColumns};
pub use state::{JobTab, ListViewState};
pub use table::{JobTable, TableAction};
