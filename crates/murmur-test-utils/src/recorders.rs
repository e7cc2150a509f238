// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recorders for backoff sleeps and preview output.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use murmur_core::ContactId;
use murmur_engine::Sleeper;
use murmur_preview::{PreviewFrame, PreviewSurface};

/// Records requested backoff delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn delays_secs(&self) -> Vec<u64> {
        self.delays().iter().map(Duration::as_secs).collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        tokio::task::yield_now().await;
    }
}

/// A frame as captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFrame {
    pub draft_index: u64,
    pub target_id: ContactId,
    pub subject: String,
    pub body: String,
    pub thinking: bool,
    pub position: u64,
    pub total: u64,
}

#[derive(Debug, Default)]
struct SurfaceLog {
    frames: Vec<RecordedFrame>,
    hides: usize,
}

/// Preview surface that keeps every frame. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<RecordedFrame> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .frames
            .clone()
    }

    pub fn hides(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).hides
    }

    /// Draft indices in the order they first appeared on screen.
    pub fn shown_indices(&self) -> Vec<u64> {
        let mut shown: Vec<u64> = Vec::new();
        for frame in self.frames() {
            if shown.last() != Some(&frame.draft_index) {
                shown.push(frame.draft_index);
            }
        }
        shown
    }

    /// Last body rendered for `draft_index`.
    pub fn final_body(&self, draft_index: u64) -> Option<String> {
        self.frames()
            .into_iter()
            .rev()
            .find(|f| f.draft_index == draft_index)
            .map(|f| f.body)
    }
}

impl PreviewSurface for RecordingSurface {
    fn render(&mut self, frame: &PreviewFrame<'_>) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .frames
            .push(RecordedFrame {
                draft_index: frame.draft_index,
                target_id: frame.target_id,
                subject: frame.subject.to_string(),
                body: frame.body.to_string(),
                thinking: frame.thinking,
                position: frame.position,
                total: frame.total,
            });
    }

    fn hide(&mut self) {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).hides += 1;
    }
}
