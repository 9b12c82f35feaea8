//! User operations

use rusqlite::{params, OptionalExtension, Row};

use super::{get_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: get_datetime(row, 2)?,
    })
}

impl Database {
    /// Create or get a user by name
    pub fn get_or_create_user(&self, username: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("username must not be empty".into()));
        }

        if let Some(user) = self.get_user_by_name(username)? {
            return Ok(user);
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username) VALUES (?) ON CONFLICT(username) DO NOTHING",
            params![username],
        )?;
        drop(conn);

        self.get_user_by_name(username)?
            .ok_or_else(|| Error::NotFound(format!("user {}", username)))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, created_at FROM users WHERE id = ?",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_name(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, created_at FROM users WHERE username = ?",
                params![username.trim()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, username, created_at FROM users ORDER BY username")?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }
}
