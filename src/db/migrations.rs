use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys=ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version: u32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: statuses, people, jobs
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE job_statuses (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            sort_order INTEGER NOT NULL UNIQUE,
            prev_order INTEGER NULL,
            next_order INTEGER NULL,
            system_type TEXT NOT NULL CHECK(system_type IN ('STANDARD','COMPLETED','WAIT_REVIEW','TERMINATED'))
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE payment_channels (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    // Currency amounts are decimal strings to avoid float rounding
    tx.execute(
        "CREATE TABLE jobs (
            id INTEGER PRIMARY KEY,
            uuid TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            job_number TEXT NOT NULL UNIQUE,
            client_name TEXT NOT NULL,
            income_cost TEXT NOT NULL DEFAULT '0',
            staff_cost TEXT NOT NULL DEFAULT '0',
            payment_channel_id INTEGER NULL REFERENCES payment_channels(id),
            is_paid INTEGER NOT NULL DEFAULT 0,
            job_type TEXT NULL,
            due_at TEXT NULL,
            started_at TEXT NULL,
            completed_at TEXT NULL,
            finished_at TEXT NULL,
            status_id INTEGER NOT NULL REFERENCES job_statuses(id),
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute("CREATE INDEX idx_jobs_status_id ON jobs(status_id)", [])?;
    tx.execute("CREATE INDEX idx_jobs_due_at ON jobs(due_at)", [])?;

    tx.execute(
        "CREATE TABLE job_assignees (
            job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id),
            PRIMARY KEY(job_id, user_id)
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE job_attachments (
            id INTEGER PRIMARY KEY,
            job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            url TEXT NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE job_status_history (
            id INTEGER PRIMARY KEY,
            job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            from_code TEXT NOT NULL,
            to_code TEXT NOT NULL,
            changed_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_job_status_history_job ON job_status_history(job_id, changed_ts)",
        [],
    )?;

    tx.execute(
        "CREATE TABLE list_views (
            name TEXT PRIMARY KEY,
            entity TEXT NOT NULL,
            query TEXT NOT NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Migration v2: default workflow
///
/// todo -> in_progress -> review -> delivered -> closed, plus cancelled
/// outside the chain.
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    let defaults: &[(&str, &str, &str, i64, Option<i64>, Option<i64>, &str)] = &[
        ("todo", "To do", "#9ca3af", 1, None, Some(2), "STANDARD"),
        ("in_progress", "In progress", "#3b82f6", 2, Some(1), Some(3), "STANDARD"),
        ("review", "Waiting review", "#f59e0b", 3, Some(2), Some(4), "WAIT_REVIEW"),
        ("delivered", "Delivered", "#10b981", 4, Some(3), Some(5), "COMPLETED"),
        ("closed", "Closed", "#6b7280", 5, Some(4), None, "TERMINATED"),
        ("cancelled", "Cancelled", "#ef4444", 6, None, None, "TERMINATED"),
    ];

    for (code, name, color, order, prev, next, system_type) in defaults {
        tx.execute(
            "INSERT INTO job_statuses (code, name, color, sort_order, prev_order, next_order, system_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![code, name, color, order, prev, next, system_type],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_sets_version() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationManager::initialize(&conn).unwrap();
        assert_eq!(MigrationManager::get_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationManager::initialize(&conn).unwrap();
        MigrationManager::initialize(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM job_statuses", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_seeded_chain_ends() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationManager::initialize(&conn).unwrap();
        let next: Option<i64> = conn
            .query_row("SELECT next_order FROM job_statuses WHERE code = 'closed'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(next, None);
    }
}
