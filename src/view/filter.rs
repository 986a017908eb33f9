//! Typed filter record for the job table
//!
//! Ranges are both-sides-present values, so a committed filter can never hold
//! a dangling `from` without a `to`. Evaluation mirrors the rest of the
//! table: every set field must match (implicit AND), multi-selects match
//! any of their values (OR within a field).

use std::collections::BTreeSet;
use chrono::{Local, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use crate::error::JobError;
use crate::models::Job;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(field: &str, from: NaiveDate, to: NaiveDate) -> Result<Self, JobError> {
        if from > to {
            return Err(JobError::validation(
                field,
                format!("start {} is after end {}", from, to),
            ));
        }
        Ok(DateRange { from, to })
    }

    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        date.map_or(false, |d| d >= self.from && d <= self.to)
    }
}

/// Inclusive decimal amount range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CostRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl CostRange {
    pub fn new(field: &str, min: Decimal, max: Decimal) -> Result<Self, JobError> {
        if min > max {
            return Err(JobError::validation(
                field,
                format!("minimum {} is above maximum {}", min, max),
            ));
        }
        Ok(CostRange { min, max })
    }

    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && amount <= self.max
    }
}

/// Filter fields of the job table
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct FilterState {
    pub created: Option<DateRange>,
    pub due: Option<DateRange>,
    pub completed: Option<DateRange>,
    pub finished: Option<DateRange>,
    pub income_cost: Option<CostRange>,
    pub staff_cost: Option<CostRange>,
    /// Status codes
    pub statuses: BTreeSet<String>,
    /// Job type codes
    pub types: BTreeSet<String>,
    /// User ids
    pub assignees: BTreeSet<i64>,
    /// Payment channel ids
    pub payment_channels: BTreeSet<i64>,
    pub paid: Option<bool>,
}

/// Names a single filter field, for clearing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Created,
    Due,
    Completed,
    Finished,
    IncomeCost,
    StaffCost,
    Statuses,
    Types,
    Assignees,
    PaymentChannels,
    Paid,
}

/// Partial filter update: only `Some` fields are merged
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPatch {
    pub created: Option<DateRange>,
    pub due: Option<DateRange>,
    pub completed: Option<DateRange>,
    pub finished: Option<DateRange>,
    pub income_cost: Option<CostRange>,
    pub staff_cost: Option<CostRange>,
    pub statuses: Option<BTreeSet<String>>,
    pub types: Option<BTreeSet<String>>,
    pub assignees: Option<BTreeSet<i64>>,
    pub payment_channels: Option<BTreeSet<i64>>,
    pub paid: Option<bool>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(v) = patch.created {
            self.created = Some(v);
        }
        if let Some(v) = patch.due {
            self.due = Some(v);
        }
        if let Some(v) = patch.completed {
            self.completed = Some(v);
        }
        if let Some(v) = patch.finished {
            self.finished = Some(v);
        }
        if let Some(v) = patch.income_cost {
            self.income_cost = Some(v);
        }
        if let Some(v) = patch.staff_cost {
            self.staff_cost = Some(v);
        }
        if let Some(v) = patch.statuses {
            self.statuses = v;
        }
        if let Some(v) = patch.types {
            self.types = v;
        }
        if let Some(v) = patch.assignees {
            self.assignees = v;
        }
        if let Some(v) = patch.payment_channels {
            self.payment_channels = v;
        }
        if let Some(v) = patch.paid {
            self.paid = Some(v);
        }
    }

    pub fn clear(&mut self, key: FilterKey) {
        match key {
            FilterKey::Created => self.created = None,
            FilterKey::Due => self.due = None,
            FilterKey::Completed => self.completed = None,
            FilterKey::Finished => self.finished = None,
            FilterKey::IncomeCost => self.income_cost = None,
            FilterKey::StaffCost => self.staff_cost = None,
            FilterKey::Statuses => self.statuses.clear(),
            FilterKey::Types => self.types.clear(),
            FilterKey::Assignees => self.assignees.clear(),
            FilterKey::PaymentChannels => self.payment_channels.clear(),
            FilterKey::Paid => self.paid = None,
        }
    }

    /// True when a job with status `code` could appear under this filter
    pub fn admits_status(&self, code: &str) -> bool {
        self.statuses.is_empty() || self.statuses.contains(code)
    }

    /// Evaluate the filter against a job
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(range) = &self.created {
            if !range.contains(created_date(job.created_ts)) {
                return false;
            }
        }
        if let Some(range) = &self.due {
            if !range.contains(job.due_at) {
                return false;
            }
        }
        if let Some(range) = &self.completed {
            if !range.contains(job.completed_at) {
                return false;
            }
        }
        if let Some(range) = &self.finished {
            if !range.contains(job.finished_at) {
                return false;
            }
        }
        if let Some(range) = &self.income_cost {
            if !range.contains(job.income_cost) {
                return false;
            }
        }
        if let Some(range) = &self.staff_cost {
            if !range.contains(job.staff_cost) {
                return false;
            }
        }
        if !self.admits_status(&job.status.code) {
            return false;
        }
        if !self.types.is_empty() {
            match &job.job_type {
                Some(t) if self.types.contains(t) => {}
                _ => return false,
            }
        }
        if !self.assignees.is_empty()
            && !job.assignees.iter().any(|u| self.assignees.contains(&u.id))
        {
            return false;
        }
        if !self.payment_channels.is_empty() {
            match job.payment_channel_id {
                Some(id) if self.payment_channels.contains(&id) => {}
                _ => return false,
            }
        }
        if let Some(paid) = self.paid {
            if job.is_paid != paid {
                return false;
            }
        }
        true
    }
}

/// Local calendar date of a creation timestamp
fn created_date(ts: i64) -> Option<NaiveDate> {
    Local.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{job, status};
    use crate::models::{SystemType, User};
    use std::str::FromStr;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn todo_job(id: i64) -> Job {
        job(id, status(1, "todo", None, Some(2), SystemType::Standard))
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(FilterState::default().is_empty());
        assert!(FilterState::default().matches(&todo_job(1)));
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        assert!(DateRange::new("due", day("2026-02-01"), day("2026-01-01")).is_err());
        let min = Decimal::from_str("10").unwrap();
        let max = Decimal::from_str("5").unwrap();
        assert!(matches!(CostRange::new("incomeCost", min, max), Err(JobError::Validation { .. })));
    }

    #[test]
    fn test_due_range_is_inclusive() {
        let mut job = todo_job(1);
        job.due_at = Some(day("2026-01-31"));
        let filter = FilterState {
            due: Some(DateRange::new("due", day("2026-01-01"), day("2026-01-31")).unwrap()),
            ..FilterState::default()
        };
        assert!(filter.matches(&job));
        job.due_at = None;
        assert!(!filter.matches(&job));
    }

    #[test]
    fn test_multi_selects_match_any() {
        let mut job = todo_job(1);
        job.assignees = vec![User { id: 3, name: "ana".to_string() }];
        let filter = FilterState {
            statuses: ["todo", "review"].iter().map(|s| s.to_string()).collect(),
            assignees: [2, 3].into_iter().collect(),
            ..FilterState::default()
        };
        assert!(filter.matches(&job));

        let filter = FilterState {
            payment_channels: [9].into_iter().collect(),
            ..FilterState::default()
        };
        assert!(!filter.matches(&job));
    }

    #[test]
    fn test_cost_and_paid() {
        let job = todo_job(1); // income 100.00, unpaid
        let filter = FilterState {
            income_cost: Some(CostRange::new("incomeCost", Decimal::ZERO, Decimal::from(100)).unwrap()),
            paid: Some(false),
            ..FilterState::default()
        };
        assert!(filter.matches(&job));
        let filter = FilterState { paid: Some(true), ..FilterState::default() };
        assert!(!filter.matches(&job));
    }

    #[test]
    fn test_merge_and_clear() {
        let mut filters = FilterState::default();
        filters.merge(FilterPatch {
            paid: Some(true),
            types: Some(["print".to_string()].into_iter().collect()),
            ..FilterPatch::default()
        });
        filters.merge(FilterPatch { paid: Some(false), ..FilterPatch::default() });
        assert_eq!(filters.paid, Some(false));
        assert!(filters.types.contains("print"));

        filters.clear(FilterKey::Types);
        filters.clear(FilterKey::Paid);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_admits_status() {
        let mut filters = FilterState::default();
        assert!(filters.admits_status("anything"));
        filters.statuses.insert("todo".to_string());
        assert!(filters.admits_status("todo"));
        assert!(!filters.admits_status("closed"));
    }
}
