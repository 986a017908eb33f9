//! Sort fields and table columns as closed enums.
//!
//! Both serialize to the camelCase keys used in shareable query strings.

use std::cmp::Ordering;
use std::fmt;
use crate::error::JobError;
use crate::models::Job;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    CreatedAt,
    DueAt,
    CompletedAt,
    JobNumber,
    DisplayName,
    ClientName,
    IncomeCost,
    StaffCost,
    Status,
}

impl SortField {
    pub const ALL: [SortField; 9] = [
        SortField::CreatedAt,
        SortField::DueAt,
        SortField::CompletedAt,
        SortField::JobNumber,
        SortField::DisplayName,
        SortField::ClientName,
        SortField::IncomeCost,
        SortField::StaffCost,
        SortField::Status,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::DueAt => "dueAt",
            SortField::CompletedAt => "completedAt",
            SortField::JobNumber => "jobNumber",
            SortField::DisplayName => "displayName",
            SortField::ClientName => "clientName",
            SortField::IncomeCost => "incomeCost",
            SortField::StaffCost => "staffCost",
            SortField::Status => "status",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Single-field sort, serialized as `field:asc` / `field:desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Sort {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.key(), self.direction.as_str())
    }
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Sort { field, direction }
    }

    /// Parse `field[:asc|desc]`; a bare field sorts ascending
    pub fn parse(spec: &str) -> Result<Self, JobError> {
        let (field, direction) = match spec.split_once(':') {
            Some((field, direction)) => (field, Some(direction)),
            None => (spec, None),
        };
        let field = SortField::from_key(field).ok_or_else(|| {
            JobError::validation("sort", format!("unknown sort field '{}'", field))
        })?;
        let direction = match direction {
            None => SortDirection::Asc,
            Some(d) => SortDirection::from_str(d).ok_or_else(|| {
                JobError::validation("sort", format!("direction must be asc or desc, got '{}'", d))
            })?,
        };
        Ok(Sort { field, direction })
    }

    /// Compare two jobs. Missing values sort last in either direction and
    /// ties fall back to ascending id so pages stay stable.
    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        let primary = match self.field {
            SortField::CreatedAt => directed(Some(a.created_ts).cmp(&Some(b.created_ts)), self.direction),
            SortField::DueAt => compare_optional(a.due_at, b.due_at, self.direction),
            SortField::CompletedAt => compare_optional(a.completed_at, b.completed_at, self.direction),
            SortField::JobNumber => directed(a.job_number.cmp(&b.job_number), self.direction),
            SortField::DisplayName => directed(
                a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()),
                self.direction,
            ),
            SortField::ClientName => directed(
                a.client_name.to_lowercase().cmp(&b.client_name.to_lowercase()),
                self.direction,
            ),
            SortField::IncomeCost => directed(a.income_cost.cmp(&b.income_cost), self.direction),
            SortField::StaffCost => directed(a.staff_cost.cmp(&b.staff_cost), self.direction),
            SortField::Status => directed(a.status.order.cmp(&b.status.order), self.direction),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn compare_optional<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => directed(a.cmp(&b), direction),
    }
}

/// Table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    JobNumber,
    DisplayName,
    Client,
    Status,
    Type,
    IncomeCost,
    StaffCost,
    PaymentChannel,
    Paid,
    DueAt,
    Assignees,
    CreatedAt,
    CompletedAt,
}

impl Column {
    /// Default display order
    pub const ALL: [Column; 13] = [
        Column::JobNumber,
        Column::DisplayName,
        Column::Client,
        Column::Status,
        Column::Type,
        Column::IncomeCost,
        Column::StaffCost,
        Column::PaymentChannel,
        Column::Paid,
        Column::DueAt,
        Column::Assignees,
        Column::CreatedAt,
        Column::CompletedAt,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Column::JobNumber => "jobNumber",
            Column::DisplayName => "displayName",
            Column::Client => "client",
            Column::Status => "status",
            Column::Type => "type",
            Column::IncomeCost => "incomeCost",
            Column::StaffCost => "staffCost",
            Column::PaymentChannel => "paymentChannel",
            Column::Paid => "paid",
            Column::DueAt => "dueAt",
            Column::Assignees => "assignees",
            Column::CreatedAt => "createdAt",
            Column::CompletedAt => "completedAt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Column::JobNumber => "Number",
            Column::DisplayName => "Name",
            Column::Client => "Client",
            Column::Status => "Status",
            Column::Type => "Type",
            Column::IncomeCost => "Income",
            Column::StaffCost => "Staff cost",
            Column::PaymentChannel => "Channel",
            Column::Paid => "Paid",
            Column::DueAt => "Due",
            Column::Assignees => "Assignees",
            Column::CreatedAt => "Created",
            Column::CompletedAt => "Completed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.key() == key)
    }
}

/// Which columns the table shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VisibleColumns {
    #[default]
    All,
    Only(Vec<Column>),
}

impl VisibleColumns {
    pub fn columns(&self) -> Vec<Column> {
        match self {
            VisibleColumns::All => Column::ALL.to_vec(),
            VisibleColumns::Only(columns) => columns.clone(),
        }
    }

    /// Parse a comma-joined column list, dropping repeats
    pub fn parse(spec: &str) -> Result<Self, JobError> {
        let mut columns = Vec::new();
        for key in spec.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            let column = Column::from_key(key).ok_or_else(|| {
                JobError::validation("columns", format!("unknown column '{}'", key))
            })?;
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        if columns.is_empty() {
            return Err(JobError::validation("columns", "at least one column is required"));
        }
        Ok(VisibleColumns::Only(columns))
    }

    pub fn to_param(&self) -> Option<String> {
        match self {
            VisibleColumns::All => None,
            VisibleColumns::Only(columns) => Some(
                columns.iter().map(|c| c.key()).collect::<Vec<_>>().join(","),
            ),
        }
    }
}
