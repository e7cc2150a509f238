// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory credit balance backed by a [`CreditStore`].
//!
//! The external store is authoritative across sessions, but queue decisions
//! read the local mirror only. The mirror is hydrated once from the store,
//! debited after each successful draft, and written back with
//! [`CreditLedger::persist`], which never blocks the caller.
//!
//! Writes are chained: each spawned write waits for the previous one, so the
//! store always ends up holding the most recent balance.

use std::sync::Arc;

use murmur_core::{CreditStore, MurmurError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Local mirror of the user's credit balance.
pub struct CreditLedger {
    balance: f64,
    store: Arc<dyn CreditStore>,
    /// Warn when a debit leaves fewer than this many units.
    low_balance_units: f64,
    /// Balance differs from what was last written (or read).
    dirty: bool,
    pending_write: Option<JoinHandle<()>>,
}

impl CreditLedger {
    /// Create a ledger with a known starting balance.
    pub fn new(balance: f64, store: Arc<dyn CreditStore>) -> Self {
        Self {
            balance: balance.max(0.0),
            store,
            low_balance_units: 0.0,
            dirty: false,
            pending_write: None,
        }
    }

    /// Create a ledger initialized from the store.
    pub async fn hydrate(store: Arc<dyn CreditStore>) -> Result<Self, MurmurError> {
        let balance = store.read().await?;
        info!(balance, "credit balance loaded");
        Ok(Self::new(balance, store))
    }

    pub fn with_low_balance_warning(mut self, units: f64) -> Self {
        self.low_balance_units = units;
        self
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Whole units of `unit_cost` the balance covers. Free work is unbounded.
    pub fn affordable_units(&self, unit_cost: f64) -> usize {
        if unit_cost <= 0.0 {
            return usize::MAX;
        }
        (self.balance / unit_cost).floor() as usize
    }

    /// Subtract one unit, clamping at zero. Returns the new balance.
    pub fn debit(&mut self, unit_cost: f64) -> f64 {
        if unit_cost <= 0.0 {
            return self.balance;
        }
        let before = self.balance;
        self.balance = (self.balance - unit_cost).max(0.0);
        self.dirty = true;

        let threshold = self.low_balance_units * unit_cost;
        if before >= threshold && self.balance < threshold {
            warn!(
                balance = self.balance,
                unit_cost, "credit balance running low"
            );
        }
        debug!(balance = self.balance, unit_cost, "credits debited");
        self.balance
    }

    /// Overwrite the mirror with an externally observed balance (top-up).
    ///
    /// The value came from outside, so nothing is scheduled for write-back.
    pub fn set_balance(&mut self, balance: f64) {
        self.balance = balance.max(0.0);
        self.dirty = false;
    }

    /// Whether the mirror holds a balance that has not been written yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the current balance to the store in the background.
    ///
    /// Does nothing when the balance has not changed. Write failures are
    /// logged and do not affect the mirror.
    pub fn persist(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let balance = self.balance;
        let store = Arc::clone(&self.store);
        let previous = self.pending_write.take();
        self.pending_write = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            match store.write(balance).await {
                Ok(()) => info!(balance, "credit balance persisted"),
                Err(e) => warn!(error = %e, balance, "failed to persist credit balance"),
            }
        }));
    }

    /// Wait for any in-flight background write to finish.
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending_write.take() {
            let _ = handle.await;
        }
    }
}
