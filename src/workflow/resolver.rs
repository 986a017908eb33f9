//! Status graph resolution
//!
//! Statuses form a chain through their `prev_status_order` and
//! `next_status_order` links. Resolution goes through [`StatusLookup`], so the
//! same rules run against the backend or an in-memory [`StatusCatalog`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use crate::backend::StatusLookup;
use crate::error::{JobError, JobResult};
use crate::models::{is_hex_color, JobStatus, Role};

fn follow<L: StatusLookup + ?Sized>(lookup: &L, order: Option<i64>) -> JobResult<Option<JobStatus>> {
    match order {
        None => Ok(None),
        Some(order) => match lookup.status_by_order(order)? {
            Some(status) => Ok(Some(status)),
            None => Err(JobError::not_found("Status", format!("order {}", order))),
        },
    }
}

/// Successor of `status`, `None` at the end of the chain
pub fn resolve_next<L: StatusLookup + ?Sized>(lookup: &L, status: &JobStatus) -> JobResult<Option<JobStatus>> {
    follow(lookup, status.next_status_order)
}

/// Predecessor of `status`, `None` at the start of the chain
pub fn resolve_prev<L: StatusLookup + ?Sized>(lookup: &L, status: &JobStatus) -> JobResult<Option<JobStatus>> {
    follow(lookup, status.prev_status_order)
}

/// Statuses a quick change may move to from `status`.
///
/// Only the direct neighbors qualify, none from a terminal status. Staff are
/// further limited to the neighbor coded `delivered_code`.
pub fn quick_targets<L: StatusLookup + ?Sized>(
    lookup: &L,
    status: &JobStatus,
    role: Role,
    delivered_code: &str,
) -> JobResult<Vec<JobStatus>> {
    if status.is_terminal() {
        return Ok(Vec::new());
    }
    let mut targets: Vec<JobStatus> = [resolve_prev(lookup, status)?, resolve_next(lookup, status)?]
        .into_iter()
        .flatten()
        .collect();
    if !role.is_admin() {
        targets.retain(|s| s.code == delivered_code);
    }
    Ok(targets)
}

/// Statuses a force change may move to: every other status, admins only
pub fn force_targets(status: &JobStatus, role: Role, catalog: &StatusCatalog) -> JobResult<Vec<JobStatus>> {
    if !role.is_admin() {
        return Err(JobError::Forbidden("force change requires the admin role".to_string()));
    }
    Ok(catalog
        .statuses()
        .iter()
        .filter(|s| s.code != status.code)
        .cloned()
        .collect())
}

/// Integrity problem in a status catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    DuplicateOrder(i64),
    DuplicateCode(String),
    DanglingLink { code: String, order: i64 },
    Asymmetric { from: String, to: String },
    BadColor { code: String, color: String },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::DuplicateOrder(order) => write!(f, "order {} is used more than once", order),
            CatalogIssue::DuplicateCode(code) => write!(f, "code '{}' is used more than once", code),
            CatalogIssue::DanglingLink { code, order } => {
                write!(f, "'{}' links to order {}, which does not exist", code, order)
            }
            CatalogIssue::Asymmetric { from, to } => {
                write!(f, "'{}' and '{}' do not link back to each other", from, to)
            }
            CatalogIssue::BadColor { code, color } => {
                write!(f, "'{}' has color '{}', expected #rrggbb", code, color)
            }
        }
    }
}

/// Status list in workflow order
#[derive(Debug, Clone, Default)]
pub struct StatusCatalog {
    statuses: Vec<JobStatus>,
}

impl StatusCatalog {
    pub fn new(mut statuses: Vec<JobStatus>) -> Self {
        statuses.sort_by_key(|s| (s.order, s.id));
        StatusCatalog { statuses }
    }

    pub fn statuses(&self) -> &[JobStatus] {
        &self.statuses
    }

    pub fn by_code(&self, code: &str) -> Option<&JobStatus> {
        self.statuses.iter().find(|s| s.code == code)
    }

    /// First status at `order`
    pub fn by_order(&self, order: i64) -> Option<&JobStatus> {
        self.statuses.iter().find(|s| s.order == order)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.statuses.iter().map(|s| s.code.as_str())
    }

    /// Check the catalog invariants; an empty list means it is sound
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        let mut seen_orders = HashSet::new();
        let mut seen_codes = HashSet::new();
        for status in &self.statuses {
            if !seen_orders.insert(status.order) {
                issues.push(CatalogIssue::DuplicateOrder(status.order));
            }
            if !seen_codes.insert(status.code.as_str()) {
                issues.push(CatalogIssue::DuplicateCode(status.code.clone()));
            }
            if !is_hex_color(&status.color) {
                issues.push(CatalogIssue::BadColor {
                    code: status.code.clone(),
                    color: status.color.clone(),
                });
            }
        }

        let by_order: HashMap<i64, &JobStatus> =
            self.statuses.iter().rev().map(|s| (s.order, s)).collect();
        for status in &self.statuses {
            for link in [status.prev_status_order, status.next_status_order].into_iter().flatten() {
                if !by_order.contains_key(&link) {
                    issues.push(CatalogIssue::DanglingLink { code: status.code.clone(), order: link });
                }
            }
            if let Some(next) = status.next_status_order.and_then(|o| by_order.get(&o)) {
                if next.prev_status_order != Some(status.order) {
                    issues.push(CatalogIssue::Asymmetric {
                        from: status.code.clone(),
                        to: next.code.clone(),
                    });
                }
            }
            if let Some(prev) = status.prev_status_order.and_then(|o| by_order.get(&o)) {
                if prev.next_status_order != Some(status.order) {
                    issues.push(CatalogIssue::Asymmetric {
                        from: prev.code.clone(),
                        to: status.code.clone(),
                    });
                }
            }
        }

        issues
    }
}

impl StatusLookup for StatusCatalog {
    fn status_by_order(&self, order: i64) -> JobResult<Option<JobStatus>> {
        Ok(self.by_order(order).cloned())
    }

    fn status_by_code(&self, code: &str) -> JobResult<Option<JobStatus>> {
        Ok(self.by_code(code).cloned())
    }
}
