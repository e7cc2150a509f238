// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine testing.
//!
//! `TestHarness` wires a [`QueueController`] to mock collaborators: a
//! scripted backend, recording sink and credit store, a notifier, and a
//! sleeper that records backoff delays instead of waiting for them.

use std::sync::Arc;

use murmur_config::model::MurmurConfig;
use murmur_core::{
    Contact, DraftSettings, DraftingMode, MurmurError, OperationId, PreviewEvent,
};
use murmur_credits::{CreditLedger, Pricing};
use murmur_engine::{
    BatchRunner, DraftRequest, GenerationWorker, ModelRotation, PreviewFeed, QueueController,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::fixtures::{ai_settings, contacts, identity};
use crate::mock_backend::MockBackend;
use crate::mock_sinks::{MockCreditStore, MockDraftSink, MockNotifier};
use crate::recorders::RecordingSleeper;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    balance: f64,
    config: MurmurConfig,
    backend: MockBackend,
    preview: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            balance: 100.0,
            config: MurmurConfig::default(),
            backend: MockBackend::new(),
            preview: false,
        }
    }

    /// Starting credit balance (default 100).
    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.engine.batch_size = batch_size;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.engine.max_retries = max_retries;
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.config.models.rotation = models;
        self
    }

    pub fn with_backend(mut self, backend: MockBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Capture preview events on [`TestHarness::preview`].
    pub fn with_preview(mut self) -> Self {
        self.preview = true;
        self
    }

    pub fn build(self) -> TestHarness {
        let config = self.config;
        let backend = Arc::new(self.backend);
        let sink = Arc::new(MockDraftSink::new());
        let store = Arc::new(MockCreditStore::new(self.balance));
        let notifier = Arc::new(MockNotifier::new());
        let sleeper = Arc::new(RecordingSleeper::new());

        let ledger = Arc::new(tokio::sync::Mutex::new(
            CreditLedger::new(self.balance, store.clone())
                .with_low_balance_warning(config.credits.low_balance_warning_units),
        ));

        let (feed, preview) = if self.preview {
            let (tx, rx) = mpsc::unbounded_channel();
            (PreviewFeed::new(tx), Some(rx))
        } else {
            (PreviewFeed::disconnected(), None)
        };

        let worker = GenerationWorker::new(
            backend.clone(),
            sink.clone(),
            ModelRotation::from_config(&config.models, &config.engine),
        );
        let runner = BatchRunner::new(
            worker,
            ledger.clone(),
            Pricing::from_config(&config.credits),
            &config.engine,
        )
        .with_sleeper(sleeper.clone())
        .with_feed(feed.clone());

        let controller = QueueController::builder(runner, ledger.clone())
            .feed(feed)
            .notifier(notifier.clone())
            .build();

        TestHarness {
            controller,
            backend,
            sink,
            store,
            notifier,
            sleeper,
            ledger,
            preview,
            config,
        }
    }
}

/// A complete engine with mock collaborators.
pub struct TestHarness {
    pub controller: QueueController,
    pub backend: Arc<MockBackend>,
    pub sink: Arc<MockDraftSink>,
    pub store: Arc<MockCreditStore>,
    pub notifier: Arc<MockNotifier>,
    pub sleeper: Arc<RecordingSleeper>,
    pub ledger: Arc<tokio::sync::Mutex<CreditLedger>>,
    /// Present when built with [`TestHarnessBuilder::with_preview`].
    pub preview: Option<UnboundedReceiver<PreviewEvent>>,
    pub config: MurmurConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn enqueue(
        &self,
        mode: DraftingMode,
        settings: DraftSettings,
        targets: Vec<Contact>,
    ) -> Result<OperationId, MurmurError> {
        self.controller.enqueue(DraftRequest {
            mode,
            settings,
            identity: identity(),
            targets,
        })
    }

    /// Enqueue an `ai` operation over `n` fresh contacts.
    pub fn enqueue_ai(&self, n: usize) -> Result<OperationId, MurmurError> {
        self.enqueue(DraftingMode::Ai, ai_settings(), contacts(n))
    }

    /// Wait until the processing loop has gone idle.
    pub async fn settle(&self) {
        self.controller.on_idle().await;
    }

    pub async fn balance(&self) -> f64 {
        self.controller.balance().await
    }

    /// Wait for pending credit writes, then return what the store holds.
    pub async fn persisted_balance(&self) -> f64 {
        self.ledger.lock().await.flush().await;
        self.store.stored().await
    }

    /// Everything sent to the preview feed so far.
    pub fn drain_preview(&mut self) -> Vec<PreviewEvent> {
        let mut events = Vec::new();
        if let Some(rx) = self.preview.as_mut() {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        events
    }
}
