// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FIFO of drafting operations.
//!
//! Only `status` and `progress` of an entry ever change. Finished operations
//! are removed; nothing terminal is kept.

use std::collections::VecDeque;

use murmur_core::{DraftingOperation, OperationId, OperationStatus, OperationView};

#[derive(Debug, Default)]
pub struct OperationQueue {
    ops: VecDeque<DraftingOperation>,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, op: DraftingOperation) {
        self.ops.push_back(op);
    }

    pub fn front(&self) -> Option<&DraftingOperation> {
        self.ops.front()
    }

    pub fn get(&self, id: &OperationId) -> Option<&DraftingOperation> {
        self.ops.iter().find(|op| op.id() == id)
    }

    fn get_mut(&mut self, id: &OperationId) -> Option<&mut DraftingOperation> {
        self.ops.iter_mut().find(|op| op.id() == id)
    }

    /// Transition `queued -> running`. Returns `false` if the entry is missing or already running.
    pub fn mark_running(&mut self, id: &OperationId) -> bool {
        match self.get_mut(id) {
            Some(op) if op.status == OperationStatus::Queued => {
                op.status = OperationStatus::Running;
                true
            }
            _ => false,
        }
    }

    /// Raise progress to `progress`, never lowering it and never exceeding the total.
    ///
    /// Returns the stored progress, or `None` if the entry is gone.
    pub fn record_progress(&mut self, id: &OperationId, progress: usize) -> Option<usize> {
        let op = self.get_mut(id)?;
        op.progress = op.progress.max(progress.min(op.total()));
        Some(op.progress)
    }

    /// Put a running entry back into the queued state with no progress.
    pub fn reset_to_queued(&mut self, id: &OperationId) -> bool {
        match self.get_mut(id) {
            Some(op) => {
                op.status = OperationStatus::Queued;
                op.progress = 0;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &OperationId) -> Option<DraftingOperation> {
        let index = self.ops.iter().position(|op| op.id() == id)?;
        self.ops.remove(index)
    }

    /// Drop every entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.ops.len();
        self.ops.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn views(&self) -> Vec<OperationView> {
        self.ops.iter().map(DraftingOperation::view).collect()
    }
}
