// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue controller: the single entry point for enqueue, cancellation and resumption.
//!
//! At most one processing loop runs at a time. The loop pulls operations off
//! the head of the queue in FIFO order and hands each to the batch runner.
//! When the runner stops for lack of credits the controller pauses; a
//! top-up (or a free operation at the head) resumes it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use murmur_core::{
    Contact, ContactId, DraftSettings, DraftSource, DraftingMode, DraftingOperation, Identity,
    MurmurError, NotificationSink, OperationId, OperationSpec, OperationSummary, OperationView,
    PreviewEvent,
};
use murmur_credits::{CreditLedger, Pricing};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::feed::PreviewFeed;
use crate::metrics;
use crate::queue::OperationQueue;
use crate::runner::{BatchRunner, RunOutcome};

const EVENT_CAPACITY: usize = 256;

/// Everything needed to create one drafting operation.
#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub mode: DraftingMode,
    pub settings: DraftSettings,
    pub identity: Identity,
    pub targets: Vec<Contact>,
}

/// Lifecycle notifications for observers.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    Enqueued {
        id: OperationId,
        total: usize,
    },
    Started {
        id: OperationId,
        mode: DraftingMode,
        total: usize,
    },
    Progress {
        id: OperationId,
        progress: usize,
        total: usize,
    },
    Finished {
        id: OperationId,
        summary: OperationSummary,
    },
    Paused {
        balance: f64,
    },
    Resumed,
    Cancelled {
        dropped: usize,
    },
    Idle,
}

struct State {
    queue: OperationQueue,
    paused_for_credits: bool,
    /// Token shared by the running operation; replaced on every cancel.
    cancel: CancellationToken,
}

struct Inner {
    state: Mutex<State>,
    processing: AtomicBool,
    next_draft_index: AtomicU64,
    runner: BatchRunner,
    ledger: Arc<tokio::sync::Mutex<CreditLedger>>,
    pricing: Pricing,
    feed: PreviewFeed,
    notifier: Option<Arc<dyn NotificationSink>>,
    events: broadcast::Sender<QueueEvent>,
    idle: watch::Sender<bool>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: QueueEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn unit_cost(&self, op: &DraftingOperation) -> f64 {
        self.pricing.unit_cost(op.spec.mode, &op.spec.settings)
    }
}

/// Cloneable handle to the drafting queue.
#[derive(Clone)]
pub struct QueueController {
    inner: Arc<Inner>,
}

/// Assembles a [`QueueController`].
pub struct ControllerBuilder {
    runner: BatchRunner,
    ledger: Arc<tokio::sync::Mutex<CreditLedger>>,
    feed: PreviewFeed,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl ControllerBuilder {
    pub fn new(runner: BatchRunner, ledger: Arc<tokio::sync::Mutex<CreditLedger>>) -> Self {
        Self {
            runner,
            ledger,
            feed: PreviewFeed::disconnected(),
            notifier: None,
        }
    }

    /// Preview events are sent here. Pass the same feed to the runner.
    pub fn feed(mut self, feed: PreviewFeed) -> Self {
        self.feed = feed;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> QueueController {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (idle, _) = watch::channel(true);
        let pricing = *self.runner.pricing();
        QueueController {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    queue: OperationQueue::new(),
                    paused_for_credits: false,
                    cancel: CancellationToken::new(),
                }),
                processing: AtomicBool::new(false),
                next_draft_index: AtomicU64::new(0),
                runner: self.runner,
                ledger: self.ledger,
                pricing,
                feed: self.feed,
                notifier: self.notifier,
                events,
                idle,
            }),
        }
    }
}

impl QueueController {
    pub fn builder(
        runner: BatchRunner,
        ledger: Arc<tokio::sync::Mutex<CreditLedger>>,
    ) -> ControllerBuilder {
        ControllerBuilder::new(runner, ledger)
    }

    /// Validate `request`, append it to the queue and start processing if idle.
    pub fn enqueue(&self, request: DraftRequest) -> Result<OperationId, MurmurError> {
        self.validate(&request)?;

        let spec = OperationSpec {
            id: OperationId::new(),
            mode: request.mode,
            settings: request.settings,
            identity: request.identity,
            targets: request.targets,
        };
        let id = spec.id.clone();
        let total = spec.total();

        let (depth, paused, resumed) = {
            let mut state = self.inner.lock();
            state.queue.push_back(DraftingOperation::new(spec));
            // A free operation that lands at the head of a paused queue can run now.
            let resumed = state.paused_for_credits
                && state
                    .queue
                    .front()
                    .is_some_and(|op| self.inner.unit_cost(op) <= 0.0);
            if resumed {
                state.paused_for_credits = false;
            }
            (state.queue.len(), state.paused_for_credits, resumed)
        };
        metrics::set_queue_depth(depth);
        info!(operation_id = %id, mode = %request.mode, total, paused, "operation enqueued");
        self.inner.emit(QueueEvent::Enqueued {
            id: id.clone(),
            total,
        });
        if resumed {
            info!(operation_id = %id, "queue resumed for free operation");
            self.inner.emit(QueueEvent::Resumed);
        }

        self.start();
        Ok(id)
    }

    /// Build a request from `source` and enqueue it.
    ///
    /// With a non-empty `selection`, only contacts whose id is listed are
    /// drafted, in source order.
    pub async fn enqueue_from(
        &self,
        source: &dyn DraftSource,
        mode: DraftingMode,
        selection: Option<&[ContactId]>,
    ) -> Result<OperationId, MurmurError> {
        let identity = source.identity().await?;
        let settings = source.settings().await?;
        let mut targets = source.targets().await?;
        if let Some(selection) = selection.filter(|s| !s.is_empty()) {
            targets.retain(|c| selection.contains(&c.id));
        }
        self.enqueue(DraftRequest {
            mode,
            settings,
            identity,
            targets,
        })
    }

    fn validate(&self, request: &DraftRequest) -> Result<(), MurmurError> {
        if request.targets.is_empty() {
            return Err(MurmurError::Config("no contacts to draft for".into()));
        }
        let settings = &request.settings;
        match request.mode {
            DraftingMode::Ai if settings.automated_prompt().is_none() => {
                return Err(MurmurError::Config(
                    "ai drafting needs a non-empty full_automated prompt block".into(),
                ));
            }
            DraftingMode::Hybrid if settings.hybrid_blocks().next().is_none() => {
                return Err(MurmurError::Config(
                    "hybrid drafting needs at least one expanded prompt block".into(),
                ));
            }
            DraftingMode::Handwritten
                if !settings.text_blocks().any(|b| !b.value.trim().is_empty()) =>
            {
                return Err(MurmurError::Config(
                    "handwritten drafting needs at least one non-empty text block".into(),
                ));
            }
            _ => {}
        }
        if request.mode.consumes_credits() && self.inner.runner.worker().rotation().is_empty() {
            return Err(MurmurError::Config("model rotation is empty".into()));
        }
        Ok(())
    }

    /// Abort the running operation, drop everything queued and clear the pause.
    pub fn cancel_all(&self) {
        let dropped = {
            let mut state = self.inner.lock();
            state.cancel.cancel();
            state.cancel = CancellationToken::new();
            state.paused_for_credits = false;
            state.queue.clear()
        };
        metrics::set_queue_depth(0);
        self.inner.feed.send(PreviewEvent::Cancel);
        info!(dropped, "drafting cancelled");
        self.inner.emit(QueueEvent::Cancelled { dropped });
    }

    /// Record an externally observed balance and resume if it now suffices.
    pub async fn credits_updated(&self, balance: f64) -> bool {
        self.inner.ledger.lock().await.set_balance(balance);
        metrics::set_credits_remaining(balance);
        info!(balance, "credit balance updated");
        self.try_resume().await
    }

    /// Leave the paused state if the head operation can run. Returns whether it resumed.
    pub async fn try_resume(&self) -> bool {
        let balance = self.inner.ledger.lock().await.balance();
        let resumed = {
            let mut state = self.inner.lock();
            if !state.paused_for_credits {
                return false;
            }
            let runnable = match state.queue.front() {
                None => true,
                Some(op) => {
                    let cost = self.inner.unit_cost(op);
                    cost <= 0.0 || balance >= cost
                }
            };
            if runnable {
                state.paused_for_credits = false;
            }
            runnable
        };

        if resumed {
            info!(balance, "queue resumed");
            self.inner.emit(QueueEvent::Resumed);
            self.start();
        } else {
            debug!(balance, "balance still insufficient, queue stays paused");
        }
        resumed
    }

    /// Resolves once no processing loop is active.
    pub async fn on_idle(&self) {
        let mut rx = self.inner.idle.subscribe();
        let _ = rx.wait_for(|idle| *idle).await;
    }

    pub fn snapshot(&self) -> Vec<OperationView> {
        self.inner.lock().queue.views()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused_for_credits
    }

    pub fn is_processing(&self) -> bool {
        self.inner.processing.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events.subscribe()
    }

    pub async fn balance(&self) -> f64 {
        self.inner.ledger.lock().await.balance()
    }

    /// Wait for the processing loop to stop, then for the last credit write to land.
    ///
    /// Queued work is not cancelled: call [`cancel_all`](Self::cancel_all)
    /// first to abandon it. The preview feed is left open so the player can
    /// finish what it was given.
    pub async fn shutdown(&self) {
        self.on_idle().await;
        let mut ledger = self.inner.ledger.lock().await;
        ledger.persist();
        ledger.flush().await;
    }

    fn start(&self) {
        start(&self.inner);
    }
}

/// Spawn the processing loop unless one is running or nothing can run.
fn start(inner: &Arc<Inner>) {
    {
        let state = inner.lock();
        if state.paused_for_credits || state.queue.is_empty() {
            return;
        }
    }
    if inner
        .processing
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        inner.idle.send_replace(false);
        tokio::spawn(process(Arc::clone(inner)));
    }
}

/// Take the head operation if the queue is runnable, marking it running.
fn next_operation(inner: &Inner) -> Option<(Arc<OperationSpec>, CancellationToken)> {
    let mut state = inner.lock();
    if state.paused_for_credits {
        return None;
    }
    let spec = Arc::clone(&state.queue.front()?.spec);
    state.queue.mark_running(&spec.id);
    Some((spec, state.cancel.clone()))
}

async fn process(inner: Arc<Inner>) {
    loop {
        let Some((spec, cancel)) = next_operation(&inner) else {
            inner.feed.send(PreviewEvent::GenerationComplete);
            inner.processing.store(false, Ordering::SeqCst);
            inner.idle.send_replace(true);

            // An enqueue may have landed between the empty check and the store.
            let runnable = {
                let state = inner.lock();
                !state.paused_for_credits && !state.queue.is_empty()
            };
            if runnable
                && inner
                    .processing
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                inner.idle.send_replace(false);
                continue;
            }
            inner.emit(QueueEvent::Idle);
            debug!("processing loop idle");
            return;
        };

        let total = spec.total();
        let base = inner
            .next_draft_index
            .fetch_add(total as u64, Ordering::SeqCst);
        inner.feed.send(PreviewEvent::Reserve {
            base,
            count: total as u64,
        });
        inner.emit(QueueEvent::Started {
            id: spec.id.clone(),
            mode: spec.mode,
            total,
        });

        let on_progress = |done: usize| {
            let progress = inner.lock().queue.record_progress(&spec.id, done);
            if let Some(progress) = progress {
                inner.emit(QueueEvent::Progress {
                    id: spec.id.clone(),
                    progress,
                    total,
                });
            }
        };
        let outcome = inner.runner.run(&spec, base, &cancel, &on_progress).await;
        finish(&inner, &spec, &outcome).await;
    }
}

async fn finish(inner: &Inner, spec: &OperationSpec, outcome: &RunOutcome) {
    let total = spec.total();
    let summary = outcome.summary(total);

    if outcome.cancelled {
        // cancel_all already cleared the queue.
        info!(operation_id = %spec.id, succeeded = outcome.succeeded, "operation cancelled");
        return;
    }

    if outcome.blocked_by_credits {
        let (depth, paused) = {
            let mut state = inner.lock();
            if outcome.succeeded == 0 {
                state.queue.reset_to_queued(&spec.id);
            } else {
                state.queue.remove(&spec.id);
            }
            // A free operation at the head keeps the queue moving.
            let paused = state
                .queue
                .front()
                .is_none_or(|op| inner.unit_cost(op) > 0.0);
            state.paused_for_credits = paused;
            (state.queue.len(), paused)
        };
        metrics::set_queue_depth(depth);
        let balance = inner.ledger.lock().await.balance();
        if outcome.succeeded > 0 {
            notify(inner, spec, summary).await;
        }
        if paused {
            warn!(
                operation_id = %spec.id,
                succeeded = outcome.succeeded,
                total,
                balance,
                "queue paused for credits"
            );
            inner.emit(QueueEvent::Paused { balance });
        }
        return;
    }

    let depth = {
        let mut state = inner.lock();
        state.queue.remove(&spec.id);
        state.queue.len()
    };
    metrics::set_queue_depth(depth);
    info!(operation_id = %spec.id, %summary, "operation finished");
    notify(inner, spec, summary).await;
}

async fn notify(inner: &Inner, spec: &OperationSpec, summary: OperationSummary) {
    if let Some(notifier) = &inner.notifier {
        notifier.notify(&spec.id, &summary).await;
    }
    inner.emit(QueueEvent::Finished {
        id: spec.id.clone(),
        summary,
    });
}
