// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Murmur drafting engine.

use thiserror::Error;

/// The primary error type used across all Murmur adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum MurmurError {
    /// Configuration errors (invalid TOML, missing prompt blocks, empty model rotation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generation backend errors (network failure, rate limiting, upstream 5xx).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend refused the request outright; retrying will not help.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The backend answered but the draft could not be extracted from the response.
    #[error("unparseable draft: {0}")]
    Parse(String),

    /// A single attempt exceeded its time budget.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Work was aborted by a cancellation signal.
    #[error("cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MurmurError {
    /// Whether another attempt at the same unit of work may succeed.
    ///
    /// Upstream failures, timeouts, unparseable responses and storage hiccups
    /// are worth retrying. Rejections, bad configuration and cancellation are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MurmurError::Provider { .. }
                | MurmurError::Parse(_)
                | MurmurError::Timeout { .. }
                | MurmurError::Storage { .. }
        )
    }
}
