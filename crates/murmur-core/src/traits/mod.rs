// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits the engine talks to.
//!
//! Adapters that own an external resource extend the [`PluginAdapter`] base
//! trait. All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod credits;
pub mod generation;
pub mod notify;
pub mod sink;
pub mod source;

pub use adapter::PluginAdapter;
pub use credits::CreditStore;
pub use generation::GenerationBackend;
pub use notify::NotificationSink;
pub use sink::DraftSink;
pub use source::DraftSource;
