// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider of the snapshots an operation is built from.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::types::{Contact, DraftSettings, Identity};

/// Supplies the sender identity, drafting settings and candidate targets.
///
/// Values are read once at enqueue and copied into the operation.
#[async_trait]
pub trait DraftSource: Send + Sync {
    async fn identity(&self) -> Result<Identity, MurmurError>;

    async fn settings(&self) -> Result<DraftSettings, MurmurError>;

    async fn targets(&self) -> Result<Vec<Contact>, MurmurError>;
}
