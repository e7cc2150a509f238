// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One draft attempt for one target.
//!
//! The worker picks the upstream model for the attempt, bounds it with a
//! timeout, applies the subject policy and hands the result to the draft
//! sink. Handwritten drafts are rendered locally from the text blocks and
//! never reach the backend.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use murmur_config::model::{EngineConfig, ModelsConfig};
use murmur_core::{
    Contact, DraftSettings, DraftSink, DraftingMode, GeneratedDraft, GenerationBackend,
    GenerationRequest, Identity, MurmurError, NewDraft, OperationSpec,
};
use regex::{Captures, Regex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Model name recorded for drafts that never touch a backend.
const LOCAL_MODEL: &str = "handwritten";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Upstream models cycled across targets and attempts.
#[derive(Debug, Clone)]
pub struct ModelRotation {
    models: Vec<String>,
    slow_markers: Vec<String>,
    timeout: Duration,
    slow_timeout: Duration,
}

impl ModelRotation {
    pub fn new(models: Vec<String>, timeout: Duration) -> Self {
        Self {
            models,
            slow_markers: Vec::new(),
            timeout,
            slow_timeout: timeout,
        }
    }

    pub fn from_config(models: &ModelsConfig, engine: &EngineConfig) -> Self {
        Self {
            models: models.rotation.clone(),
            slow_markers: models.slow_markers.clone(),
            timeout: Duration::from_secs(engine.attempt_timeout_secs),
            slow_timeout: Duration::from_secs(engine.slow_attempt_timeout_secs),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model for attempt `attempt` of the target at `position`.
    ///
    /// Offsetting by position spreads a batch across models; offsetting by
    /// attempt moves a retry off the model that just failed.
    pub fn model_for(&self, position: usize, attempt: u32) -> Option<&str> {
        if self.models.is_empty() {
            return None;
        }
        let index = (position + attempt as usize) % self.models.len();
        Some(&self.models[index])
    }

    pub fn is_slow(&self, model: &str) -> bool {
        let model = model.to_ascii_lowercase();
        self.slow_markers.iter().any(|m| model.contains(m.as_str()))
    }

    pub fn timeout_for(&self, model: &str) -> Duration {
        if self.is_slow(model) {
            self.slow_timeout
        } else {
            self.timeout
        }
    }
}

/// Produces and persists drafts, one attempt at a time.
pub struct GenerationWorker {
    backend: Arc<dyn GenerationBackend>,
    sink: Arc<dyn DraftSink>,
    rotation: ModelRotation,
}

impl GenerationWorker {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        sink: Arc<dyn DraftSink>,
        rotation: ModelRotation,
    ) -> Self {
        Self {
            backend,
            sink,
            rotation,
        }
    }

    pub fn rotation(&self) -> &ModelRotation {
        &self.rotation
    }

    /// Run attempt `attempt` for `spec.targets[position]` and persist the result.
    ///
    /// A persistence failure fails the attempt, so the caller's retry covers it.
    pub async fn attempt(
        &self,
        spec: &Arc<OperationSpec>,
        position: usize,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> Result<GeneratedDraft, MurmurError> {
        if cancel.is_cancelled() {
            return Err(MurmurError::Cancelled);
        }
        let contact = &spec.targets[position];

        let mut draft = match spec.mode {
            DraftingMode::Handwritten => {
                render_handwritten(&spec.settings, &spec.identity, contact)?
            }
            DraftingMode::Ai | DraftingMode::Hybrid => {
                self.generate(spec, position, attempt, cancel).await?
            }
        };

        apply_subject_policy(&mut draft, &spec.settings);
        if draft.message.trim().is_empty() {
            return Err(MurmurError::Parse("backend returned an empty message".into()));
        }

        self.sink
            .create_draft(&NewDraft {
                operation_id: spec.id.clone(),
                contact_id: contact.id,
                email: contact.email.clone(),
                subject: draft.subject.clone(),
                message: draft.message.clone(),
                mode: spec.mode,
                font: spec.settings.font.clone(),
                signature: spec.settings.signature.clone(),
            })
            .await?;

        Ok(draft)
    }

    async fn generate(
        &self,
        spec: &Arc<OperationSpec>,
        position: usize,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> Result<GeneratedDraft, MurmurError> {
        let model = self
            .rotation
            .model_for(position, attempt)
            .ok_or_else(|| MurmurError::Config("model rotation is empty".into()))?
            .to_string();
        let timeout = self.rotation.timeout_for(&model);
        let request = GenerationRequest {
            spec: Arc::clone(spec),
            position,
            attempt,
            model,
        };

        debug!(
            operation_id = %spec.id,
            contact_id = %request.contact().id,
            attempt,
            model = %request.model,
            timeout_secs = timeout.as_secs(),
            "generation attempt"
        );

        tokio::select! {
            _ = cancel.cancelled() => Err(MurmurError::Cancelled),
            result = tokio::time::timeout(timeout, self.backend.generate(&request, cancel)) => {
                result.map_err(|_| MurmurError::Timeout { duration: timeout })?
            }
        }
    }

    /// The model name an attempt is attributed to in logs.
    pub fn model_label(&self, mode: DraftingMode, position: usize, attempt: u32) -> &str {
        match mode {
            DraftingMode::Handwritten => LOCAL_MODEL,
            _ => self
                .rotation
                .model_for(position, attempt)
                .unwrap_or(LOCAL_MODEL),
        }
    }
}

/// When the user fixed a subject, it replaces whatever was generated.
pub fn apply_subject_policy(draft: &mut GeneratedDraft, settings: &DraftSettings) {
    if settings.ai_subject {
        return;
    }
    if let Some(subject) = settings.subject.as_deref().map(str::trim)
        && !subject.is_empty()
    {
        draft.subject = subject.to_string();
    }
}

/// Render a handwritten draft: expanded text blocks with contact placeholders filled in.
pub fn render_handwritten(
    settings: &DraftSettings,
    identity: &Identity,
    contact: &Contact,
) -> Result<GeneratedDraft, MurmurError> {
    let template = settings
        .text_blocks()
        .map(|b| b.value.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if template.trim().is_empty() {
        return Err(MurmurError::Config(
            "handwritten drafts need at least one non-empty text block".into(),
        ));
    }

    let message = fill_placeholders(&template, identity, contact);
    let subject = settings
        .subject
        .as_deref()
        .map(|s| fill_placeholders(s, identity, contact))
        .unwrap_or_default();

    Ok(GeneratedDraft { subject, message })
}

/// Replace `{{name}}` tokens. Unknown names are left untouched; known but empty fields become "".
pub fn fill_placeholders(template: &str, identity: &Identity, contact: &Contact) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let field = |v: &Option<String>| v.clone().unwrap_or_default();
            match &caps[1] {
                "firstName" => field(&contact.first_name),
                "lastName" => field(&contact.last_name),
                "company" => field(&contact.company),
                "city" => field(&contact.city),
                "state" => field(&contact.state),
                "country" => field(&contact.country),
                "website" => field(&contact.website),
                "email" => field(&contact.email),
                "phone" => field(&contact.phone),
                "senderName" => identity.name.clone(),
                "senderWebsite" => field(&identity.website),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
