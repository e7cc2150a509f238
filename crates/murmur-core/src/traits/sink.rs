// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence sink for generated drafts.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::traits::adapter::PluginAdapter;
use crate::types::NewDraft;

/// Stores a finished draft. Called at most once per successful target.
#[async_trait]
pub trait DraftSink: PluginAdapter {
    async fn create_draft(&self, draft: &NewDraft) -> Result<(), MurmurError>;
}
