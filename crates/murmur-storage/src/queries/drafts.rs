// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draft persistence.

use murmur_core::{MurmurError, NewDraft};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::DraftRow;

/// Insert a draft. Returns the new row id.
pub async fn insert_draft(db: &Database, draft: &NewDraft) -> Result<i64, MurmurError> {
    let operation_id = draft.operation_id.0.clone();
    let contact_id = draft.contact_id.0;
    let email = draft.email.clone();
    let subject = draft.subject.clone();
    let message = draft.message.clone();
    let mode = draft.mode.to_string();
    let font = draft.font.clone();
    let signature = draft.signature.clone();

    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO drafts (operation_id, contact_id, email, subject, message, \
                 mode, font, signature) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    operation_id,
                    contact_id,
                    email,
                    subject,
                    message,
                    mode,
                    font,
                    signature
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// List drafts, oldest first, optionally restricted to one operation.
pub async fn list_drafts(
    db: &Database,
    operation_id: Option<&str>,
) -> Result<Vec<DraftRow>, MurmurError> {
    let operation_id = operation_id.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<Vec<DraftRow>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, operation_id, contact_id, email, subject, message, mode, font, \
                 signature, created_at FROM drafts \
                 WHERE ?1 IS NULL OR operation_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![operation_id], |row| {
                Ok(DraftRow {
                    id: row.get(0)?,
                    operation_id: row.get(1)?,
                    contact_id: row.get(2)?,
                    email: row.get(3)?,
                    subject: row.get(4)?,
                    message: row.get(5)?,
                    mode: row.get(6)?,
                    font: row.get(7)?,
                    signature: row.get(8)?,
                    created_at: row.get(9)?,
                })
            })?;
            let drafts = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(drafts)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of drafts stored for a contact.
pub async fn count_for_contact(db: &Database, contact_id: i64) -> Result<i64, MurmurError> {
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM drafts WHERE contact_id = ?1",
                params![contact_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::{ContactId, DraftingMode, OperationId};

    fn draft(op: &OperationId, contact: i64) -> NewDraft {
        NewDraft {
            operation_id: op.clone(),
            contact_id: ContactId(contact),
            email: Some(format!("c{contact}@example.com")),
            subject: "Quick question".to_string(),
            message: "Hello there".to_string(),
            mode: DraftingMode::Hybrid,
            font: "Arial".to_string(),
            signature: None,
        }
    }

    #[tokio::test]
    async fn insert_and_list_by_operation() {
        let db = Database::open_in_memory().await.unwrap();
        let a = OperationId::new();
        let b = OperationId::new();
        insert_draft(&db, &draft(&a, 1)).await.unwrap();
        insert_draft(&db, &draft(&b, 2)).await.unwrap();
        insert_draft(&db, &draft(&a, 3)).await.unwrap();

        let only_a = list_drafts(&db, Some(&a.0)).await.unwrap();
        assert_eq!(only_a.len(), 2);
        assert_eq!(only_a[0].contact_id, 1);
        assert_eq!(only_a[1].contact_id, 3);
        assert_eq!(only_a[0].mode, "hybrid");

        let all = list_drafts(&db, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(!all[0].created_at.is_empty());
    }

    #[tokio::test]
    async fn counts_per_contact() {
        let db = Database::open_in_memory().await.unwrap();
        let op = OperationId::new();
        insert_draft(&db, &draft(&op, 9)).await.unwrap();
        insert_draft(&db, &draft(&op, 9)).await.unwrap();
        assert_eq!(count_for_contact(&db, 9).await.unwrap(), 2);
        assert_eq!(count_for_contact(&db, 10).await.unwrap(), 0);
    }
}
