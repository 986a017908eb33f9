use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{JobStatus, SystemType};
use anyhow::{Context, Result};

const STATUS_COLUMNS: &str =
    "id, code, name, color, sort_order, prev_order, next_order, system_type";

pub struct StatusRepo;

impl StatusRepo {
    /// Map a status row starting at column `offset`
    pub(crate) fn from_row(row: &Row, offset: usize) -> rusqlite::Result<JobStatus> {
        let system_type: String = row.get(offset + 7)?;
        let system_type = SystemType::from_str(&system_type).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 7,
                rusqlite::types::Type::Text,
                format!("unknown system type '{}'", system_type).into(),
            )
        })?;
        Ok(JobStatus {
            id: row.get(offset)?,
            code: row.get(offset + 1)?,
            name: row.get(offset + 2)?,
            color: row.get(offset + 3)?,
            order: row.get(offset + 4)?,
            prev_status_order: row.get(offset + 5)?,
            next_status_order: row.get(offset + 6)?,
            system_type,
        })
    }

    /// List all statuses in workflow order
    pub fn list_all(conn: &Connection) -> Result<Vec<JobStatus>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM job_statuses ORDER BY sort_order, id",
            STATUS_COLUMNS
        ))?;
        let rows = stmt.query_map([], |row| Self::from_row(row, 0))?;

        let mut statuses = Vec::new();
        for row in rows {
            statuses.push(row?);
        }
        Ok(statuses)
    }

    pub fn get_by_order(conn: &Connection, order: i64) -> Result<Option<JobStatus>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM job_statuses WHERE sort_order = ?1 ORDER BY id LIMIT 1",
            STATUS_COLUMNS
        ))?;
        let status = stmt.query_row([order], |row| Self::from_row(row, 0)).optional()?;
        Ok(status)
    }

    pub fn get_by_code(conn: &Connection, code: &str) -> Result<Option<JobStatus>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM job_statuses WHERE code = ?1",
            STATUS_COLUMNS
        ))?;
        let status = stmt.query_row([code], |row| Self::from_row(row, 0)).optional()?;
        Ok(status)
    }

    /// The status new jobs start in when none is given
    pub fn first(conn: &Connection) -> Result<Option<JobStatus>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM job_statuses ORDER BY sort_order LIMIT 1",
            STATUS_COLUMNS
        ))?;
        let status = stmt.query_row([], |row| Self::from_row(row, 0)).optional()?;
        Ok(status)
    }

    /// Insert a status row. Catalog-level checks are the caller's job.
    pub fn create(
        conn: &Connection,
        code: &str,
        name: &str,
        color: &str,
        order: i64,
        prev_order: Option<i64>,
        next_order: Option<i64>,
        system_type: SystemType,
    ) -> Result<JobStatus> {
        conn.execute(
            "INSERT INTO job_statuses (code, name, color, sort_order, prev_order, next_order, system_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![code, name, color, order, prev_order, next_order, system_type.as_str()],
        )
        .with_context(|| format!("Failed to create status '{}'", code))?;

        Ok(JobStatus {
            id: conn.last_insert_rowid(),
            code: code.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            order,
            prev_status_order: prev_order,
            next_status_order: next_order,
            system_type,
        })
    }

    /// Repoint the neighbor links of the status at `order`
    pub fn set_links(
        conn: &Connection,
        order: i64,
        prev_order: Option<i64>,
        next_order: Option<i64>,
    ) -> Result<()> {
        let updated = conn
            .execute(
                "UPDATE job_statuses SET prev_order = ?1, next_order = ?2 WHERE sort_order = ?3",
                rusqlite::params![prev_order, next_order, order],
            )
            .with_context(|| format!("Failed to relink status order={}", order))?;
        if updated == 0 {
            anyhow::bail!("No status found with order={}", order);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[test]
    fn test_list_all_in_order() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let statuses = StatusRepo::list_all(&conn).unwrap();
        let codes: Vec<&str> = statuses.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["todo", "in_progress", "review", "delivered", "closed", "cancelled"]);
    }

    #[test]
    fn test_get_by_order_and_code() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let review = StatusRepo::get_by_order(&conn, 3).unwrap().unwrap();
        assert_eq!(review.code, "review");
        assert_eq!(review.system_type, SystemType::WaitReview);
        assert!(StatusRepo::get_by_order(&conn, 42).unwrap().is_none());
        assert_eq!(StatusRepo::get_by_code(&conn, "closed").unwrap().unwrap().order, 5);
    }

    #[test]
    fn test_first_status() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert_eq!(StatusRepo::first(&conn).unwrap().unwrap().code, "todo");
    }

    #[test]
    fn test_create_and_relink() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let status = StatusRepo::create(&conn, "on_hold", "On hold", "#a855f7", 7, None, None, SystemType::Standard).unwrap();
        assert_eq!(status.order, 7);
        StatusRepo::set_links(&conn, 7, Some(2), None).unwrap();
        let reloaded = StatusRepo::get_by_code(&conn, "on_hold").unwrap().unwrap();
        assert_eq!(reloaded.prev_status_order, Some(2));
        assert!(StatusRepo::set_links(&conn, 99, None, None).is_err());
    }

    #[test]
    fn test_duplicate_order_rejected() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let result = StatusRepo::create(&conn, "dup", "Dup", "#000000", 1, None, None, SystemType::Standard);
        assert!(result.is_err());
    }
}
