// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drafting engine for Murmur.
//!
//! This crate provides:
//! - **Generation worker**: one attempt for one contact, bounded by a per-model timeout
//! - **Batch runner**: bounded-concurrency execution of an operation with
//!   per-target exponential backoff and credit gating
//! - **Operation queue**: strict FIFO of drafting operations
//! - **Queue controller**: enqueue, cancel-all and pause/resume on credit exhaustion
//! - **Shutdown**: signal handling that cancels in-flight work

pub mod controller;
pub mod feed;
pub mod metrics;
pub mod queue;
pub mod retry;
pub mod runner;
pub mod shutdown;
pub mod worker;

pub use controller::{ControllerBuilder, DraftRequest, QueueController, QueueEvent};
pub use feed::PreviewFeed;
pub use queue::OperationQueue;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper, backoff_delay};
pub use runner::{BatchRunner, RunOutcome};
pub use shutdown::install_signal_handler;
pub use worker::{GenerationWorker, ModelRotation, fill_placeholders, render_handwritten};
