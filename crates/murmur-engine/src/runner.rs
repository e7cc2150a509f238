// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded-concurrency execution of one operation.
//!
//! Targets are dispatched in order, in batches of at most `batch_size`. A
//! batch never holds more targets than the ledger can pay for, so the
//! balance cannot be overdrawn by concurrent successes. Each target retries
//! transient failures with exponential backoff; a failure of one target
//! never affects its batch siblings.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::future::join_all;
use murmur_config::model::EngineConfig;
use murmur_core::{
    BatchGenerationResult, ContactId, DraftingMode, LivePreviewQueueEntry, MurmurError,
    OperationSpec, OperationSummary, PreviewEvent,
};
use murmur_credits::{CreditLedger, Pricing};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::feed::PreviewFeed;
use crate::metrics;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::worker::GenerationWorker;

/// Result of running one operation to the point where it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// One entry per dispatched target, in target order.
    pub results: Vec<BatchGenerationResult>,
    pub succeeded: usize,
    /// The balance ran out before every target was dispatched.
    pub blocked_by_credits: bool,
    pub cancelled: bool,
    /// Size of each dispatched batch.
    pub batches: Vec<usize>,
}

impl RunOutcome {
    pub fn dispatched(&self) -> usize {
        self.results.len()
    }

    pub fn summary(&self, total: usize) -> OperationSummary {
        if self.cancelled {
            OperationSummary::Cancelled {
                succeeded: self.succeeded,
                total,
            }
        } else if self.blocked_by_credits {
            OperationSummary::BlockedByCredits {
                succeeded: self.succeeded,
                total,
            }
        } else {
            OperationSummary::from_counts(self.succeeded, total)
        }
    }
}

/// Runs operations batch by batch against a shared credit ledger.
pub struct BatchRunner {
    worker: GenerationWorker,
    ledger: Arc<Mutex<CreditLedger>>,
    pricing: Pricing,
    policy: RetryPolicy,
    batch_size: usize,
    sleeper: Arc<dyn Sleeper>,
    feed: PreviewFeed,
}

impl BatchRunner {
    pub fn new(
        worker: GenerationWorker,
        ledger: Arc<Mutex<CreditLedger>>,
        pricing: Pricing,
        config: &EngineConfig,
    ) -> Self {
        Self {
            worker,
            ledger,
            pricing,
            policy: RetryPolicy::from_config(config),
            batch_size: config.batch_size.max(1),
            sleeper: Arc::new(TokioSleeper),
            feed: PreviewFeed::disconnected(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_feed(mut self, feed: PreviewFeed) -> Self {
        self.feed = feed;
        self
    }

    pub fn worker(&self) -> &GenerationWorker {
        &self.worker
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Run `spec` from its first target until done, blocked or cancelled.
    ///
    /// Preview indices are `base + position`. `on_progress` receives the
    /// running count of successful drafts after each success.
    pub async fn run(
        &self,
        spec: &Arc<OperationSpec>,
        base: u64,
        cancel: &CancellationToken,
        on_progress: &(dyn Fn(usize) + Send + Sync),
    ) -> RunOutcome {
        let total = spec.total();
        let cost = self.pricing.unit_cost(spec.mode, &spec.settings);
        let succeeded = AtomicUsize::new(0);
        let mut outcome = RunOutcome::default();
        let mut cursor = 0usize;

        info!(
            operation_id = %spec.id,
            mode = %spec.mode,
            total,
            unit_cost = cost,
            "operation started"
        );

        while cursor < total {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let affordable = self.ledger.lock().await.affordable_units(cost);
            if affordable == 0 {
                warn!(
                    operation_id = %spec.id,
                    dispatched = cursor,
                    total,
                    "insufficient credits, stopping operation"
                );
                for position in cursor..total {
                    self.feed.send(PreviewEvent::Skip {
                        draft_index: base + position as u64,
                    });
                }
                outcome.blocked_by_credits = true;
                break;
            }

            let size = self.batch_size.min(affordable).min(total - cursor);
            let started = Instant::now();
            debug!(operation_id = %spec.id, cursor, size, "dispatching batch");

            let units = (cursor..cursor + size).map(|position| {
                self.run_target(spec, position, base, cost, cancel, &succeeded, on_progress)
            });
            let results = join_all(units).await;

            metrics::record_batch_duration(started.elapsed().as_secs_f64());
            outcome.batches.push(size);
            outcome.results.extend(results);
            cursor += size;
        }

        self.ledger.lock().await.persist();

        if cancel.is_cancelled() {
            outcome.cancelled = true;
        }
        outcome.succeeded = succeeded.load(Ordering::SeqCst);

        info!(
            operation_id = %spec.id,
            succeeded = outcome.succeeded,
            dispatched = outcome.dispatched(),
            total,
            blocked = outcome.blocked_by_credits,
            cancelled = outcome.cancelled,
            "operation stopped"
        );
        outcome
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_target(
        &self,
        spec: &Arc<OperationSpec>,
        position: usize,
        base: u64,
        cost: f64,
        cancel: &CancellationToken,
        succeeded: &AtomicUsize,
        on_progress: &(dyn Fn(usize) + Send + Sync),
    ) -> BatchGenerationResult {
        let contact = &spec.targets[position];
        let draft_index = base + position as u64;
        let mut attempt = 0u32;

        loop {
            if attempt > 0 {
                let delay = self.policy.delay_for(attempt);
                metrics::record_retry(spec.mode);
                tokio::select! {
                    _ = cancel.cancelled() => return cancelled(spec.mode, contact.id, attempt),
                    _ = self.sleeper.sleep(delay) => {}
                }
            }

            match self.worker.attempt(spec, position, attempt, cancel).await {
                Ok(draft) => {
                    let balance = self.ledger.lock().await.debit(cost);
                    metrics::set_credits_remaining(balance);
                    metrics::record_draft(spec.mode, "drafted");

                    let done = succeeded.fetch_add(1, Ordering::SeqCst) + 1;
                    on_progress(done);
                    self.feed.send(PreviewEvent::Draft(LivePreviewQueueEntry {
                        draft_index,
                        target_id: contact.id,
                        subject: draft.subject,
                        message: draft.message,
                    }));
                    return BatchGenerationResult {
                        target_id: contact.id,
                        success: true,
                        error: None,
                        retries: attempt,
                    };
                }
                Err(MurmurError::Cancelled) => return cancelled(spec.mode, contact.id, attempt),
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    let model = self.worker.model_label(spec.mode, position, attempt);
                    warn!(
                        operation_id = %spec.id,
                        contact_id = %contact.id,
                        attempt,
                        model,
                        error = %e,
                        retry_in_ms = self.policy.delay_for(attempt + 1).as_millis() as u64,
                        "draft attempt failed, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        operation_id = %spec.id,
                        contact_id = %contact.id,
                        retries = attempt,
                        error = %e,
                        "giving up on target"
                    );
                    metrics::record_draft(spec.mode, "failed");
                    self.feed.send(PreviewEvent::Skip { draft_index });
                    return BatchGenerationResult {
                        target_id: contact.id,
                        success: false,
                        error: Some(e.to_string()),
                        retries: attempt,
                    };
                }
            }
        }
    }
}

fn cancelled(mode: DraftingMode, target_id: ContactId, retries: u32) -> BatchGenerationResult {
    metrics::record_draft(mode, "cancelled");
    BatchGenerationResult {
        target_id,
        success: false,
        error: Some(MurmurError::Cancelled.to_string()),
        retries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use murmur_core::OperationId;
    use murmur_test_utils::{
        Failure, MockBackend, MockCreditStore, MockDraftSink, ai_settings, contacts, identity,
    };
    use tracing_test::traced_test;

    use crate::worker::ModelRotation;

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn runner(backend: Arc<MockBackend>, balance: f64) -> BatchRunner {
        let store = Arc::new(MockCreditStore::new(balance));
        let ledger = Arc::new(Mutex::new(CreditLedger::new(balance, store)));
        let worker = GenerationWorker::new(
            backend,
            Arc::new(MockDraftSink::new()),
            ModelRotation::new(vec!["model-a".into()], Duration::from_secs(45)),
        );
        BatchRunner::new(worker, ledger, Pricing::default(), &EngineConfig::default())
            .with_sleeper(Arc::new(NoSleep))
    }

    fn spec(targets: usize) -> Arc<OperationSpec> {
        Arc::new(OperationSpec {
            id: OperationId::new(),
            mode: DraftingMode::Ai,
            settings: ai_settings(),
            identity: identity(),
            targets: contacts(targets),
        })
    }

    #[traced_test]
    #[tokio::test]
    async fn retries_are_logged_as_warnings() {
        let backend = Arc::new(MockBackend::new());
        backend.fail(0, Failure::Transient(1)).await;
        let outcome = runner(backend, 10.0)
            .run(&spec(1), 0, &CancellationToken::new(), &|_| {})
            .await;
        assert_eq!(outcome.succeeded, 1);
        assert!(logs_contain("draft attempt failed, retrying"));
        assert!(!logs_contain("giving up on target"));
    }

    #[tokio::test]
    async fn already_cancelled_run_dispatches_nothing() {
        let backend = Arc::new(MockBackend::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = runner(backend.clone(), 10.0)
            .run(&spec(4), 0, &cancel, &|_| {})
            .await;
        assert!(outcome.cancelled);
        assert!(outcome.batches.is_empty());
        assert_eq!(backend.call_count().await, 0);
    }

    #[tokio::test]
    async fn batch_never_exceeds_affordable_units() {
        let backend = Arc::new(MockBackend::new());
        let outcome = runner(backend, 2.0)
            .run(&spec(5), 0, &CancellationToken::new(), &|_| {})
            .await;
        assert_eq!(outcome.batches, vec![2]);
        assert_eq!(outcome.succeeded, 2);
        assert!(outcome.blocked_by_credits);
    }

    #[test]
    fn summary_prefers_cancel_over_block() {
        let outcome = RunOutcome {
            succeeded: 1,
            blocked_by_credits: true,
            cancelled: true,
            ..RunOutcome::default()
        };
        assert_eq!(
            outcome.summary(4),
            OperationSummary::Cancelled {
                succeeded: 1,
                total: 4
            }
        );
    }

    #[test]
    fn summary_of_blocked_run() {
        let outcome = RunOutcome {
            succeeded: 2,
            blocked_by_credits: true,
            ..RunOutcome::default()
        };
        assert_eq!(
            outcome.summary(5),
            OperationSummary::BlockedByCredits {
                succeeded: 2,
                total: 5
            }
        );
    }

    #[test]
    fn summary_of_complete_run() {
        let outcome = RunOutcome {
            succeeded: 3,
            ..RunOutcome::default()
        };
        assert_eq!(outcome.summary(3), OperationSummary::AllDrafted { total: 3 });
        assert_eq!(
            RunOutcome::default().summary(3),
            OperationSummary::Failed { total: 3 }
        );
    }
}
