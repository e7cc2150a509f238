// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the engine, the preview player and the adapters.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a drafting operation (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub String);

impl OperationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a contact in the external contact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays for the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Generation,
    DraftSink,
    CreditStore,
}

// --- Snapshots ---

/// A recipient of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Contact {
    /// A contact with only an id, used by tests and fixtures.
    pub fn with_id(id: i64) -> Self {
        Self {
            id: ContactId(id),
            first_name: None,
            last_name: None,
            email: None,
            company: None,
            city: None,
            state: None,
            country: None,
            website: None,
            phone: None,
        }
    }
}

/// Sender profile captured at enqueue time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub name: String,
    pub website: Option<String>,
    pub bio: Option<String>,
}

/// The role of a prompt block in the drafting settings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    FullAutomated,
    Introduction,
    Research,
    Action,
    Text,
}

/// One block of the prompt composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBlock {
    pub kind: BlockKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub collapsed: bool,
}

impl PromptBlock {
    pub fn new(kind: BlockKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            collapsed: false,
        }
    }
}

/// Drafting configuration captured at enqueue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftSettings {
    pub font: String,
    /// When false, `subject` replaces whatever subject the backend produces.
    pub ai_subject: bool,
    pub subject: Option<String>,
    pub hybrid_prompt: Option<String>,
    pub blocks: Vec<PromptBlock>,
    pub tone: String,
    pub paragraphs: u8,
    pub signature: Option<String>,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            ai_subject: true,
            subject: None,
            hybrid_prompt: None,
            blocks: Vec::new(),
            tone: "professional".to_string(),
            paragraphs: 3,
            signature: None,
        }
    }
}

impl DraftSettings {
    /// The free-form prompt of the first non-empty `full_automated` block.
    pub fn automated_prompt(&self) -> Option<&str> {
        self.blocks
            .iter()
            .filter(|b| b.kind == BlockKind::FullAutomated)
            .map(|b| b.value.trim())
            .find(|v| !v.is_empty())
    }

    /// Expanded blocks that make up a hybrid prompt.
    pub fn hybrid_blocks(&self) -> impl Iterator<Item = &PromptBlock> {
        self.blocks
            .iter()
            .filter(|b| !b.collapsed && b.kind != BlockKind::FullAutomated)
    }

    /// Expanded literal text blocks used by handwritten drafts.
    pub fn text_blocks(&self) -> impl Iterator<Item = &PromptBlock> {
        self.blocks
            .iter()
            .filter(|b| !b.collapsed && b.kind == BlockKind::Text)
    }
}

// --- Operations ---

/// How drafts of an operation are produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DraftingMode {
    Ai,
    Hybrid,
    Handwritten,
}

impl DraftingMode {
    /// Handwritten drafts are rendered locally and cost nothing.
    pub fn consumes_credits(self) -> bool {
        !matches!(self, DraftingMode::Handwritten)
    }
}

/// Lifecycle of an operation while it sits in the queue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Queued,
    Running,
}

/// The immutable part of a drafting operation, fixed at enqueue.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSpec {
    pub id: OperationId,
    pub mode: DraftingMode,
    pub settings: DraftSettings,
    pub identity: Identity,
    pub targets: Vec<Contact>,
}

impl OperationSpec {
    pub fn total(&self) -> usize {
        self.targets.len()
    }
}

/// A queued or running operation: shared spec plus mutable progress.
#[derive(Debug, Clone)]
pub struct DraftingOperation {
    pub spec: Arc<OperationSpec>,
    pub status: OperationStatus,
    pub progress: usize,
}

impl DraftingOperation {
    pub fn new(spec: OperationSpec) -> Self {
        Self {
            spec: Arc::new(spec),
            status: OperationStatus::Queued,
            progress: 0,
        }
    }

    pub fn id(&self) -> &OperationId {
        &self.spec.id
    }

    pub fn total(&self) -> usize {
        self.spec.total()
    }

    pub fn view(&self) -> OperationView {
        OperationView {
            id: self.spec.id.clone(),
            mode: self.spec.mode,
            status: self.status,
            progress: self.progress,
            total: self.total(),
        }
    }
}

/// Read-only snapshot of a queue entry for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationView {
    pub id: OperationId,
    pub mode: DraftingMode,
    pub status: OperationStatus,
    pub progress: usize,
    pub total: usize,
}

// --- Generation ---

/// Input to a single generation attempt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub spec: Arc<OperationSpec>,
    /// Index of the target within `spec.targets`.
    pub position: usize,
    /// Zero-based attempt number for this target.
    pub attempt: u32,
    /// Upstream model selected for this attempt.
    pub model: String,
}

impl GenerationRequest {
    pub fn contact(&self) -> &Contact {
        &self.spec.targets[self.position]
    }
}

/// Subject and body produced for one contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDraft {
    pub subject: String,
    pub message: String,
}

/// A draft ready to be handed to the persistence sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDraft {
    pub operation_id: OperationId,
    pub contact_id: ContactId,
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
    pub mode: DraftingMode,
    pub font: String,
    pub signature: Option<String>,
}

/// Per-target outcome of a batch. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchGenerationResult {
    pub target_id: ContactId,
    pub success: bool,
    pub error: Option<String>,
    pub retries: u32,
}

// --- Preview feed ---

/// A persisted draft waiting to be typed out by the preview player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivePreviewQueueEntry {
    pub draft_index: u64,
    pub target_id: ContactId,
    pub subject: String,
    pub message: String,
}

/// Messages flowing from the engine to the preview player.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewEvent {
    /// Indices `base..base + count` now belong to a running operation.
    Reserve { base: u64, count: u64 },
    /// A draft for a reserved index has been persisted.
    Draft(LivePreviewQueueEntry),
    /// A reserved index will never produce a draft.
    Skip { draft_index: u64 },
    /// No more drafts are coming until the next `Reserve`.
    GenerationComplete,
    /// Drop everything and hide.
    Cancel,
}

// --- Summaries ---

/// Terminal outcome of one operation, shown to the user once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationSummary {
    AllDrafted { total: usize },
    Partial { succeeded: usize, total: usize },
    Failed { total: usize },
    BlockedByCredits { succeeded: usize, total: usize },
    Cancelled { succeeded: usize, total: usize },
}

impl OperationSummary {
    /// Summary for an operation that ran every target.
    pub fn from_counts(succeeded: usize, total: usize) -> Self {
        if succeeded == 0 {
            OperationSummary::Failed { total }
        } else if succeeded >= total {
            OperationSummary::AllDrafted { total }
        } else {
            OperationSummary::Partial { succeeded, total }
        }
    }

    pub fn succeeded(&self) -> usize {
        match *self {
            OperationSummary::AllDrafted { total } => total,
            OperationSummary::Failed { .. } => 0,
            OperationSummary::Partial { succeeded, .. }
            | OperationSummary::BlockedByCredits { succeeded, .. }
            | OperationSummary::Cancelled { succeeded, .. } => succeeded,
        }
    }
}

impl fmt::Display for OperationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            OperationSummary::AllDrafted { total } => {
                write!(f, "All {total} drafts generated")
            }
            OperationSummary::Partial { succeeded, total } => {
                write!(f, "{succeeded}/{total} drafts generated")
            }
            OperationSummary::Failed { total } => {
                write!(f, "Failed to generate any of {total} drafts")
            }
            OperationSummary::BlockedByCredits { succeeded, .. } => {
                write!(f, "Generated {succeeded} drafts before running out of credits")
            }
            OperationSummary::Cancelled { succeeded, total } => {
                write!(f, "Cancelled after {succeeded}/{total} drafts")
            }
        }
    }
}
