// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete drafting pipeline.
//!
//! Each test wires a real SQLite store in a temp directory and the OpenRouter
//! backend pointed at a local mock server into a queue controller. Tests are
//! independent and order-insensitive.

use std::sync::Arc;

use murmur_config::MurmurConfig;
use murmur_core::{CreditStore, DraftingMode, OperationSummary};
use murmur_credits::{CreditLedger, Pricing};
use murmur_engine::{BatchRunner, DraftRequest, GenerationWorker, ModelRotation, QueueController};
use murmur_openrouter::OpenRouterBackend;
use murmur_storage::SqliteStore;
use murmur_test_utils::{MockNotifier, ai_settings, contacts, handwritten_settings, identity};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Pipeline {
    controller: QueueController,
    store: Arc<SqliteStore>,
    notifier: Arc<MockNotifier>,
    _dir: TempDir,
}

impl Pipeline {
    /// Wait for the queue to drain, then flush the balance to SQLite.
    async fn finish(&self) {
        self.controller.on_idle().await;
        self.controller.shutdown().await;
    }

    async fn summaries(&self) -> Vec<OperationSummary> {
        self.notifier
            .summaries()
            .await
            .into_iter()
            .map(|(_, summary)| summary)
            .collect()
    }
}

fn reply(subject: &str, message: &str) -> ResponseTemplate {
    let content = serde_json::json!({"subject": subject, "message": message}).to_string();
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

async fn pipeline(server: &MockServer, balance: f64) -> Pipeline {
    let dir = tempfile::tempdir().unwrap();
    let mut config = MurmurConfig::default();
    config.storage.database_path = dir.path().join("murmur.db").display().to_string();
    config.openrouter.api_key = Some("sk-or-test".into());
    config.openrouter.base_url = server.uri();
    config.engine.backoff_base_ms = 1;

    let store = Arc::new(SqliteStore::open(&config.storage).await.unwrap());
    store.write(balance).await.unwrap();
    let ledger = Arc::new(tokio::sync::Mutex::new(
        CreditLedger::hydrate(store.clone()).await.unwrap(),
    ));

    let worker = GenerationWorker::new(
        Arc::new(OpenRouterBackend::new(&config.openrouter).unwrap()),
        store.clone(),
        ModelRotation::from_config(&config.models, &config.engine),
    );
    let runner = BatchRunner::new(
        worker,
        ledger.clone(),
        Pricing::from_config(&config.credits),
        &config.engine,
    );
    let notifier = Arc::new(MockNotifier::new());
    let controller = QueueController::builder(runner, ledger)
        .notifier(notifier.clone())
        .build();

    Pipeline {
        controller,
        store,
        notifier,
        _dir: dir,
    }
}

fn request(mode: DraftingMode, n: usize) -> DraftRequest {
    DraftRequest {
        mode,
        settings: match mode {
            DraftingMode::Handwritten => handwritten_settings(),
            _ => ai_settings(),
        },
        identity: identity(),
        targets: contacts(n),
    }
}

// ---- Test 1: Drafts flow from the backend into SQLite ----

#[tokio::test]
async fn test_generated_drafts_are_stored_and_charged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(reply("Quick idea", "Hi there,\n\nBest,\nSam Sender"))
        .expect(4)
        .mount(&server)
        .await;

    let p = pipeline(&server, 10.0).await;
    p.controller.enqueue(request(DraftingMode::Ai, 4)).unwrap();
    p.finish().await;

    let drafts = p.store.drafts(None).await.unwrap();
    assert_eq!(drafts.len(), 4);
    assert!(drafts.iter().all(|d| d.subject == "Quick idea"));
    assert!(drafts.iter().all(|d| d.message == "Hi there,"));
    assert!(drafts.iter().all(|d| d.mode == "ai"));
    assert_eq!(p.store.read().await.unwrap(), 6.0);
    assert_eq!(p.summaries().await, vec![OperationSummary::AllDrafted { total: 4 }]);
}

// ---- Test 2: Transient upstream failures are retried ----

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "Rate limited"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(reply("Second try", "Hello."))
        .mount(&server)
        .await;

    let p = pipeline(&server, 10.0).await;
    p.controller.enqueue(request(DraftingMode::Ai, 1)).unwrap();
    p.finish().await;

    let drafts = p.store.drafts(None).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].subject, "Second try");
    assert_eq!(p.store.read().await.unwrap(), 9.0);
}

// ---- Test 3: Permanent rejections are not retried and cost nothing ----

#[tokio::test]
async fn test_rejected_requests_fail_without_charge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "No auth credentials found"}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let p = pipeline(&server, 10.0).await;
    p.controller.enqueue(request(DraftingMode::Ai, 2)).unwrap();
    p.finish().await;

    assert!(p.store.drafts(None).await.unwrap().is_empty());
    assert_eq!(p.store.read().await.unwrap(), 10.0);
    assert_eq!(p.summaries().await, vec![OperationSummary::Failed { total: 2 }]);
}

// ---- Test 4: Running out of credits pauses the queue ----

#[tokio::test]
async fn test_credit_exhaustion_pauses_and_persists_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("Hi", "Short note."))
        .expect(2)
        .mount(&server)
        .await;

    let p = pipeline(&server, 2.0).await;
    p.controller.enqueue(request(DraftingMode::Ai, 5)).unwrap();
    p.controller.on_idle().await;

    assert!(p.controller.is_paused());
    assert_eq!(p.store.drafts(None).await.unwrap().len(), 2);
    assert_eq!(
        p.summaries().await,
        vec![OperationSummary::BlockedByCredits { succeeded: 2, total: 5 }]
    );

    p.controller.shutdown().await;
    assert_eq!(p.store.read().await.unwrap(), 0.0);
}

// ---- Test 5: Handwritten drafts never reach the backend ----

#[tokio::test]
async fn test_handwritten_drafts_skip_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("unused", "unused"))
        .expect(0)
        .mount(&server)
        .await;

    let p = pipeline(&server, 0.0).await;
    p.controller
        .enqueue(request(DraftingMode::Handwritten, 3))
        .unwrap();
    p.finish().await;

    let drafts = p.store.drafts(None).await.unwrap();
    assert_eq!(drafts.len(), 3);
    assert!(drafts.iter().all(|d| d.subject == "Hello from Sam Sender"));
    assert_eq!(p.store.read().await.unwrap(), 0.0);
}
