use rusqlite::{Connection, OptionalExtension};
use crate::models::{PaymentChannel, User};
use anyhow::{Context, Result};

/// Users that jobs can be assigned to
pub struct UserRepo;

impl UserRepo {
    pub fn create(conn: &Connection, name: &str) -> Result<User> {
        conn.execute("INSERT INTO users (name) VALUES (?1)", [name])
            .with_context(|| format!("Failed to create user '{}'", name))?;
        Ok(User {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
        let user = conn
            .query_row("SELECT id, name FROM users WHERE id = ?1", [id], |row| {
                Ok(User { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(user)
    }

    pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<User>> {
        let user = conn
            .query_row("SELECT id, name FROM users WHERE name = ?1", [name], |row| {
                Ok(User { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(user)
    }

    pub fn list_all(conn: &Connection) -> Result<Vec<User>> {
        let mut stmt = conn.prepare("SELECT id, name FROM users ORDER BY name")?;
        let rows = stmt.query_map([], |row| Ok(User { id: row.get(0)?, name: row.get(1)? }))?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    /// Users assigned to a job, by name
    pub fn list_for_job(conn: &Connection, job_id: i64) -> Result<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name FROM job_assignees a
             JOIN users u ON u.id = a.user_id
             WHERE a.job_id = ?1 ORDER BY u.name",
        )?;
        let rows = stmt.query_map([job_id], |row| Ok(User { id: row.get(0)?, name: row.get(1)? }))?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}

/// Payment channels referenced by jobs
pub struct ChannelRepo;

impl ChannelRepo {
    pub fn create(conn: &Connection, name: &str) -> Result<PaymentChannel> {
        conn.execute("INSERT INTO payment_channels (name) VALUES (?1)", [name])
            .with_context(|| format!("Failed to create payment channel '{}'", name))?;
        Ok(PaymentChannel {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<PaymentChannel>> {
        let channel = conn
            .query_row("SELECT id, name FROM payment_channels WHERE id = ?1", [id], |row| {
                Ok(PaymentChannel { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(channel)
    }

    pub fn get_by_name(conn: &Connection, name: &str) -> Result<Option<PaymentChannel>> {
        let channel = conn
            .query_row("SELECT id, name FROM payment_channels WHERE name = ?1", [name], |row| {
                Ok(PaymentChannel { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(channel)
    }

    pub fn list_all(conn: &Connection) -> Result<Vec<PaymentChannel>> {
        let mut stmt = conn.prepare("SELECT id, name FROM payment_channels ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(PaymentChannel { id: row.get(0)?, name: row.get(1)? })
        })?;
        let mut channels = Vec::new();
        for row in rows {
            channels.push(row?);
        }
        Ok(channels)
    }
}
