// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation backend trait for producing one draft for one contact.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::MurmurError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GeneratedDraft, GenerationRequest};

/// Produces a subject and message for a single contact.
///
/// Implementations should return promptly with [`MurmurError::Cancelled`]
/// once `cancel` fires. Errors for which [`MurmurError::is_transient`] holds
/// are retried by the caller.
#[async_trait]
pub trait GenerationBackend: PluginAdapter {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedDraft, MurmurError>;
}
