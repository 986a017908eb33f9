// Job status workflow: graph resolution, gated mutations, bulk execution

pub mod bulk;
pub mod gateway;
pub mod resolver;

pub use bulk::{BulkAction, BulkExecutor, BulkReport};
pub use gateway::{Actor, Direction, StatusGateway};
pub use resolver::{
    force_targets, quick_targets, resolve_next, resolve_prev, CatalogIssue, StatusCatalog,
};
