// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::types::{OperationId, OperationSummary};

/// Receives one summary per finished operation. Purely observational.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn notify(&self, operation_id: &OperationId, summary: &OperationSummary);
}
