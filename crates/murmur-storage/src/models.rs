// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

/// A persisted draft as stored in the `drafts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftRow {
    pub id: i64,
    pub operation_id: String,
    pub contact_id: i64,
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
    pub mode: String,
    pub font: String,
    pub signature: Option<String>,
    pub created_at: String,
}
