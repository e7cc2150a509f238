// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockBackend` produces a draft derived from the contact, unless a failure
//! has been scripted for that contact. It records every call and the peak
//! number of concurrent calls, and can be held so tests observe in-flight work.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use murmur_core::{
    AdapterType, ContactId, GeneratedDraft, GenerationBackend, GenerationRequest, HealthStatus,
    MurmurError, PluginAdapter,
};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

/// A scripted failure for one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Fail with a transient provider error for the first `n` attempts.
    Transient(u32),
    /// Always fail with a transient provider error.
    Always,
    /// Fail with a permanent rejection.
    Rejected,
    /// Return an empty message every time.
    Empty,
}

/// One recorded call to [`MockBackend::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCall {
    pub contact_id: ContactId,
    pub attempt: u32,
    pub model: String,
}

pub struct MockBackend {
    failures: Mutex<HashMap<ContactId, Failure>>,
    calls: Mutex<Vec<BackendCall>>,
    delay: Option<Duration>,
    held: watch::Sender<bool>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        let (held, _) = watch::channel(false);
        Self {
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            held,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Each call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn fail(&self, contact: i64, failure: Failure) {
        self.failures.lock().await.insert(ContactId(contact), failure);
    }

    /// Block new and in-flight calls until [`MockBackend::release`].
    pub fn hold(&self) {
        self.held.send_replace(true);
    }

    pub fn release(&self) {
        self.held.send_replace(false);
    }

    pub async fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn answer(&self, request: &GenerationRequest) -> Result<GeneratedDraft, MurmurError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut held = self.held.subscribe();
        let _ = held.wait_for(|h| !*h).await;

        let contact = request.contact();
        let failure = self.failures.lock().await.get(&contact.id).copied();
        match failure {
            Some(Failure::Transient(n)) if request.attempt < n => Err(provider_error(request)),
            Some(Failure::Always) => Err(provider_error(request)),
            Some(Failure::Rejected) => Err(MurmurError::Rejected(format!(
                "model {} refused contact {}",
                request.model, contact.id
            ))),
            Some(Failure::Empty) => Ok(GeneratedDraft {
                subject: "Empty".into(),
                message: "   ".into(),
            }),
            _ => {
                let name = contact.first_name.as_deref().unwrap_or("there");
                Ok(GeneratedDraft {
                    subject: format!("Hello {name}"),
                    message: format!("Hi {name}, this is a draft for contact {}.", contact.id),
                })
            }
        }
    }
}

fn provider_error(request: &GenerationRequest) -> MurmurError {
    MurmurError::Provider {
        message: format!("mock failure on attempt {}", request.attempt),
        source: None,
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedDraft, MurmurError> {
        self.calls.lock().await.push(BackendCall {
            contact_id: request.contact().id,
            attempt: request.attempt,
            model: request.model.clone(),
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(MurmurError::Cancelled),
            result = self.answer(request) => result,
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ai_settings, contacts, identity};
    use murmur_core::{DraftingMode, OperationId, OperationSpec};
    use std::sync::Arc;

    fn request(contact: i64, attempt: u32) -> GenerationRequest {
        GenerationRequest {
            spec: Arc::new(OperationSpec {
                id: OperationId::new(),
                mode: DraftingMode::Ai,
                settings: ai_settings(),
                identity: identity(),
                targets: contacts(contact as usize + 1),
            }),
            position: contact as usize,
            attempt,
            model: "mock/model".into(),
        }
    }

    #[tokio::test]
    async fn default_draft_mentions_contact() {
        let backend = MockBackend::new();
        let draft = backend
            .generate(&request(0, 0), &CancellationToken::new())
            .await
            .unwrap();
        assert!(draft.message.contains("contact 0"));
        assert_eq!(backend.call_count().await, 1);
    }

    #[tokio::test]
    async fn transient_failure_clears_after_n_attempts() {
        let backend = MockBackend::new();
        backend.fail(1, Failure::Transient(2)).await;
        let cancel = CancellationToken::new();
        assert!(backend.generate(&request(1, 0), &cancel).await.is_err());
        assert!(backend.generate(&request(1, 1), &cancel).await.is_err());
        assert!(backend.generate(&request(1, 2), &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn cancelled_while_held() {
        let backend = MockBackend::new();
        backend.hold();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = backend.generate(&request(0, 0), &cancel).await.unwrap_err();
        assert!(matches!(err, MurmurError::Cancelled));
        assert_eq!(backend.in_flight(), 0);
    }
}
