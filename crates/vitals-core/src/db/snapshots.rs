//! Snapshot operations
//!
//! Snapshots are append-only. Histories are always returned oldest first,
//! with insertion order breaking ties between equal timestamps.

use chrono::{SubsecRound, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{get_datetime, Database, SQLITE_DATETIME};
use crate::analytics::savings_rate;
use crate::error::{Error, Result};
use crate::models::{NewSnapshot, Snapshot};

const SNAPSHOT_COLUMNS: &str =
    "id, user_id, recorded_at, income, expenses, debts, investments, savings_rate";

fn row_to_snapshot(row: &Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        id: row.get(0)?,
        user_id: row.get(1)?,
        recorded_at: get_datetime(row, 2)?,
        income: row.get(3)?,
        expenses: row.get(4)?,
        debts: row.get(5)?,
        investments: row.get(6)?,
        savings_rate: row.get(7)?,
    })
}

impl Database {
    /// Record a snapshot for a user, deriving its savings rate
    ///
    /// Timestamps are stored at second precision; the returned snapshot
    /// carries the stored value.
    pub fn insert_snapshot(&self, user_id: i64, new: &NewSnapshot) -> Result<Snapshot> {
        new.validate()?;
        if self.get_user(user_id)?.is_none() {
            return Err(Error::NotFound(format!("user {}", user_id)));
        }

        let recorded_at = new.recorded_at.unwrap_or_else(Utc::now).trunc_subsecs(0);
        let rate = savings_rate(new.income, new.expenses);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO snapshots (user_id, recorded_at, income, expenses, debts, investments, savings_rate)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                recorded_at.format(SQLITE_DATETIME).to_string(),
                new.income,
                new.expenses,
                new.debts,
                new.investments,
                rate
            ],
        )?;
        let id = conn.last_insert_rowid();

        debug!(user_id, snapshot_id = id, savings_rate = rate, "Recorded snapshot");

        Ok(Snapshot {
            id,
            user_id,
            recorded_at,
            income: new.income,
            expenses: new.expenses,
            debts: new.debts,
            investments: new.investments,
            savings_rate: rate,
        })
    }

    /// A user's full history, oldest first
    pub fn get_history(&self, user_id: i64) -> Result<Vec<Snapshot>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM snapshots WHERE user_id = ? ORDER BY recorded_at ASC, id ASC",
            SNAPSHOT_COLUMNS
        ))?;

        let history = stmt
            .query_map(params![user_id], row_to_snapshot)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(history)
    }

    /// The most recent snapshot for a user
    pub fn latest_snapshot(&self, user_id: i64) -> Result<Option<Snapshot>> {
        let conn = self.conn()?;
        let snapshot = conn
            .query_row(
                &format!(
                    "SELECT {} FROM snapshots WHERE user_id = ? ORDER BY recorded_at DESC, id DESC LIMIT 1",
                    SNAPSHOT_COLUMNS
                ),
                params![user_id],
                row_to_snapshot,
            )
            .optional()?;

        Ok(snapshot)
    }

    pub fn count_snapshots(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM snapshots WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
