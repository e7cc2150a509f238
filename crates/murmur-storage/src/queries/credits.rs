// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-row credit balance.

use murmur_core::MurmurError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

pub async fn read_balance(db: &Database) -> Result<f64, MurmurError> {
    db.connection()
        .call(|conn| -> Result<f64, rusqlite::Error> {
            conn.query_row(
                "SELECT COALESCE((SELECT balance FROM credit_balance WHERE id = 1), 0.0)",
                [],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the balance. Negative values are stored as zero.
pub async fn write_balance(db: &Database, balance: f64) -> Result<(), MurmurError> {
    let balance = balance.max(0.0);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO credit_balance (id, balance) VALUES (1, ?1) \
                 ON CONFLICT(id) DO UPDATE SET balance = excluded.balance, \
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![balance],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_database_has_zero_balance() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(read_balance(&db).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn write_then_read() {
        let db = Database::open_in_memory().await.unwrap();
        write_balance(&db, 12.5).await.unwrap();
        assert_eq!(read_balance(&db).await.unwrap(), 12.5);
        write_balance(&db, -3.0).await.unwrap();
        assert_eq!(read_balance(&db).await.unwrap(), 0.0);
    }
}
