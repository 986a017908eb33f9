//! Error taxonomy shared by the backend, the workflow gateway and the view layer.
//!
//! Every variant except [`JobError::Storage`] is recoverable: the caller shows
//! the message and leaves its prior state untouched.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Malformed input caught before any request is sent
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The job's status changed since it was last read
    #[error("Job {job_id} is now '{actual}', not '{expected}'. Refresh and try again.")]
    Conflict {
        job_id: i64,
        expected: String,
        actual: String,
    },

    #[error("{entity} not found: {key}{}", suggestion.as_ref().map(|s| format!("\n  Did you mean '{}'?", s)).unwrap_or_default())]
    NotFound {
        entity: &'static str,
        key: String,
        suggestion: Option<String>,
    },

    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Transient backend unavailability; retried only when the user re-runs the action
    #[error("Backend unavailable: {0}")]
    Network(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl JobError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        JobError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        JobError::NotFound {
            entity,
            key: key.to_string(),
            suggestion: None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, JobError::Storage(_))
    }

    /// Classify a store failure. Busy and locked databases are transient.
    pub fn from_store(err: anyhow::Error) -> Self {
        if let Some(job_err) = err.downcast_ref::<JobError>() {
            return job_err.clone();
        }
        if let Some(sql_err) = err.downcast_ref::<rusqlite::Error>() {
            return JobError::from(sql_err);
        }
        JobError::Storage(format!("{:#}", err))
    }
}

impl From<&rusqlite::Error> for JobError {
    fn from(err: &rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, _)
                if matches!(
                    failure.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                JobError::Network(err.to_string())
            }
            _ => JobError::Storage(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for JobError {
    fn from(err: rusqlite::Error) -> Self {
        JobError::from(&err)
    }
}

pub type JobResult<T> = std::result::Result<T, JobError>;
