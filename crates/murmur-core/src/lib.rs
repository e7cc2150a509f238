// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Murmur drafting engine.
//!
//! This crate provides the error type, the domain types shared between the
//! engine and the preview player, and the collaborator traits that storage,
//! generation and notification adapters implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MurmurError;
pub use types::{
    AdapterType, BatchGenerationResult, BlockKind, Contact, ContactId, DraftSettings,
    DraftingMode, DraftingOperation, GeneratedDraft, GenerationRequest, HealthStatus, Identity,
    LivePreviewQueueEntry, NewDraft, OperationId, OperationSpec, OperationStatus,
    OperationSummary, OperationView, PreviewEvent, PromptBlock,
};

pub use traits::{
    CreditStore, DraftSink, DraftSource, GenerationBackend, NotificationSink, PluginAdapter,
};
