// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sending half of the preview channel.

use murmur_core::PreviewEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Optional link to the preview player.
///
/// A disconnected feed (no player, or the player has exited) swallows events;
/// preview is never allowed to affect drafting.
#[derive(Debug, Clone, Default)]
pub struct PreviewFeed {
    tx: Option<UnboundedSender<PreviewEvent>>,
}

impl PreviewFeed {
    pub fn new(tx: UnboundedSender<PreviewEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn send(&self, event: PreviewEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let feed = PreviewFeed::new(tx);
        feed.send(PreviewEvent::GenerationComplete);
        assert_eq!(rx.try_recv().unwrap(), PreviewEvent::GenerationComplete);
    }

    #[test]
    fn closed_or_missing_receiver_is_ignored() {
        PreviewFeed::disconnected().send(PreviewEvent::Cancel);
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        PreviewFeed::new(tx).send(PreviewEvent::Cancel);
    }
}
