// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Murmur integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic,
//! CI-runnable tests without network access or a real database.
//!
//! # Components
//!
//! - [`MockBackend`] - scripted generation backend with per-contact failures
//! - [`MockDraftSink`], [`MockCreditStore`], [`MockNotifier`] - recording collaborators
//! - [`RecordingSleeper`], [`RecordingSurface`] - observe backoff and preview output
//! - [`TestHarness`] - a fully wired queue controller over the mocks

pub mod fixtures;
pub mod harness;
pub mod mock_backend;
pub mod mock_sinks;
pub mod recorders;

pub use fixtures::{
    StaticSource, ai_settings, contacts, handwritten_settings, hybrid_settings, identity,
};
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_backend::{Failure, MockBackend};
pub use mock_sinks::{MockCreditStore, MockDraftSink, MockNotifier};
pub use recorders::{RecordingSleeper, RecordingSurface};
