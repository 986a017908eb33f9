use rusqlite::{Connection, OptionalExtension};
use anyhow::{Context, Result};

/// A saved list view: a named, serialized list state
#[derive(Debug, Clone)]
pub struct SavedView {
    pub name: String,
    pub entity: String,
    pub query: String,
    pub created_ts: i64,
    pub modified_ts: i64,
}

pub struct ViewRepo;

impl ViewRepo {
    pub fn get_by_name(conn: &Connection, entity: &str, name: &str) -> Result<Option<SavedView>> {
        let mut stmt = conn.prepare(
            "SELECT name, entity, query, created_ts, modified_ts
             FROM list_views WHERE entity = ?1 AND name = ?2"
        )?;
        let view = stmt.query_row([entity, name], |row| {
            Ok(SavedView {
                name: row.get(0)?,
                entity: row.get(1)?,
                query: row.get(2)?,
                created_ts: row.get(3)?,
                modified_ts: row.get(4)?,
            })
        }).optional()?;
        Ok(view)
    }

    pub fn list(conn: &Connection, entity: &str) -> Result<Vec<SavedView>> {
        let mut stmt = conn.prepare(
            "SELECT name, entity, query, created_ts, modified_ts
             FROM list_views WHERE entity = ?1 ORDER BY name"
        )?;
        let rows = stmt.query_map([entity], |row| {
            Ok(SavedView {
                name: row.get(0)?,
                entity: row.get(1)?,
                query: row.get(2)?,
                created_ts: row.get(3)?,
                modified_ts: row.get(4)?,
            })
        })?;
        let mut views = Vec::new();
        for row in rows {
            views.push(row?);
        }
        Ok(views)
    }

    pub fn upsert(conn: &Connection, name: &str, entity: &str, query: &str) -> Result<SavedView> {
        let now = chrono::Utc::now().timestamp();
        let existing = Self::get_by_name(conn, entity, name)?;
        let created_ts = existing.as_ref().map(|v| v.created_ts).unwrap_or(now);

        conn.execute(
            "INSERT INTO list_views (name, entity, query, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
               entity = excluded.entity,
               query = excluded.query,
               modified_ts = excluded.modified_ts",
            rusqlite::params![name, entity, query, created_ts, now],
        )
        .with_context(|| format!("Failed to save view '{}'", name))?;

        Ok(SavedView {
            name: name.to_string(),
            entity: entity.to_string(),
            query: query.to_string(),
            created_ts,
            modified_ts: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[test]
    fn test_upsert_and_get() {
        let conn = DbConnection::connect_in_memory().unwrap();
        ViewRepo::upsert(&conn, "unpaid", "jobs", "paid=false").unwrap();
        let view = ViewRepo::get_by_name(&conn, "jobs", "unpaid").unwrap().unwrap();
        assert_eq!(view.query, "paid=false");

        let updated = ViewRepo::upsert(&conn, "unpaid", "jobs", "paid=false&sort=dueAt%3Aasc").unwrap();
        assert_eq!(updated.created_ts, view.created_ts);
        assert_eq!(ViewRepo::list(&conn, "jobs").unwrap().len(), 1);
        assert!(ViewRepo::get_by_name(&conn, "statuses", "unpaid").unwrap().is_none());
    }
}
