use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::models::{JobStatus, SystemType, User};

/// Job model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub uuid: String,
    pub display_name: String,
    pub job_number: String,
    pub client_name: String,
    pub income_cost: Decimal,
    pub staff_cost: Decimal,
    pub payment_channel_id: Option<i64>,
    pub is_paid: bool,
    pub job_type: Option<String>,
    pub due_at: Option<NaiveDate>,
    pub started_at: Option<NaiveDate>,
    pub completed_at: Option<NaiveDate>,
    pub finished_at: Option<NaiveDate>,
    pub assignees: Vec<User>,
    pub attachments: Vec<String>,
    pub status: JobStatus,
    pub created_ts: i64,
    pub modified_ts: i64,
}

/// Fields for a new job
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub display_name: String,
    pub job_number: Option<String>,
    pub client_name: String,
    pub income_cost: Decimal,
    pub staff_cost: Decimal,
    pub payment_channel_id: Option<i64>,
    pub job_type: Option<String>,
    pub due_at: Option<NaiveDate>,
    pub assignee_ids: Vec<i64>,
    pub attachments: Vec<String>,
    /// Initial status code; the lowest-ordered status when absent
    pub status_code: Option<String>,
}

/// Date stamps to apply when a job enters `target`
///
/// Returns (started_at, completed_at, finished_at).
pub fn stamp_dates(
    job: &Job,
    target: &JobStatus,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>, Option<NaiveDate>) {
    let started_at = job.started_at.or(Some(today));
    match target.system_type {
        SystemType::Completed => (started_at, Some(today), None),
        SystemType::Terminated => (started_at, job.completed_at, Some(today)),
        SystemType::Standard | SystemType::WaitReview => (started_at, None, None),
    }
}

/// Format the generated job number for a row id
pub fn job_number_for(id: i64) -> String {
    format!("J-{:05}", id)
}

/// True for numbers in the generated `J-<digits>` form
pub fn is_generated_job_number(number: &str) -> bool {
    number
        .strip_prefix("J-")
        .map_or(false, |digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// Status and job type codes: lowercase letters, digits and underscores
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn status(order: i64, code: &str, prev: Option<i64>, next: Option<i64>, system_type: SystemType) -> JobStatus {
        JobStatus {
            id: order,
            code: code.to_string(),
            name: code.replace('_', " "),
            color: "#888888".to_string(),
            order,
            prev_status_order: prev,
            next_status_order: next,
            system_type,
        }
    }

    pub fn job(id: i64, status: JobStatus) -> Job {
        Job {
            id,
            uuid: format!("uuid-{}", id),
            display_name: format!("Job {}", id),
            job_number: job_number_for(id),
            client_name: "Acme".to_string(),
            income_cost: Decimal::new(10000, 2),
            staff_cost: Decimal::new(4000, 2),
            payment_channel_id: None,
            is_paid: false,
            job_type: None,
            due_at: None,
            started_at: None,
            completed_at: None,
            finished_at: None,
            assignees: Vec::new(),
            attachments: Vec::new(),
            status,
            created_ts: 0,
            modified_ts: 0,
        }
    }
}
