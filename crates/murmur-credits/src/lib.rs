// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credit metering for the Murmur drafting engine.
//!
//! This crate provides:
//! - **Pricing**: per-draft cost derived from the drafting mode and paragraph count
//! - **Credit ledger**: an in-memory mirror of the persisted balance that gates
//!   queue decisions and writes back to the credit store without blocking

pub mod ledger;
pub mod pricing;

pub use ledger::CreditLedger;
pub use pricing::Pricing;
