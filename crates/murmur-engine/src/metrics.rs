// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Recorded through the metrics-rs facade; without an installed recorder
//! every call is a no-op.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use murmur_core::DraftingMode;

/// Register all Murmur metric descriptions.
pub fn register_metrics() {
    describe_counter!("murmur_drafts_total", "Draft attempts by final outcome");
    describe_counter!("murmur_retries_total", "Generation retries scheduled");
    describe_gauge!("murmur_credits_remaining", "Local credit balance");
    describe_gauge!("murmur_queue_depth", "Operations waiting or running");
    describe_histogram!(
        "murmur_batch_duration_seconds",
        "Wall time of one concurrent batch"
    );
}

/// Record the final outcome of one target.
pub fn record_draft(mode: DraftingMode, outcome: &'static str) {
    metrics::counter!("murmur_drafts_total", "mode" => mode.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_retry(mode: DraftingMode) {
    metrics::counter!("murmur_retries_total", "mode" => mode.to_string()).increment(1);
}

pub fn set_credits_remaining(balance: f64) {
    metrics::gauge!("murmur_credits_remaining").set(balance);
}

pub fn set_queue_depth(depth: usize) {
    metrics::gauge!("murmur_queue_depth").set(depth as f64);
}

pub fn record_batch_duration(seconds: f64) {
    metrics::histogram!("murmur_batch_duration_seconds").record(seconds);
}
