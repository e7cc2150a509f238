// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Preview player state machine and its tokio driver.
//!
//! The player keeps a buffer of drafts keyed by draft index and plays them
//! strictly in index order, one character per tick. Indices the engine will
//! never fill arrive as `Skip` events so the cursor can move past them.
//!
//! Every scheduled tick carries the run id it was scheduled under.
//! `Cancel` bumps the run id, which turns any tick still in flight into a
//! no-op.

use std::collections::BTreeMap;
use std::time::Duration;

use murmur_core::{LivePreviewQueueEntry, PreviewEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::cadence::Cadence;
use crate::surface::{PreviewFrame, PreviewSurface};

/// How long a fully typed draft stays on screen before the next one starts.
const DWELL: Duration = Duration::from_millis(900);

/// A timer request issued by [`PreviewPlayer::next_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub run_id: u64,
    pub delay: Duration,
}

enum Slot {
    Ready(LivePreviewQueueEntry),
    Skipped,
}

struct Playing {
    entry: LivePreviewQueueEntry,
    /// Byte length of the revealed message prefix.
    revealed: usize,
    thinking: bool,
}

impl Playing {
    fn is_done(&self) -> bool {
        self.revealed >= self.entry.message.len()
    }

    fn next_char(&self) -> Option<char> {
        self.entry.message[self.revealed..].chars().next()
    }

    fn prev_char(&self) -> Option<char> {
        self.entry.message[..self.revealed].chars().next_back()
    }
}

/// Consumption-side scheduler for the live preview.
pub struct PreviewPlayer<S> {
    surface: S,
    cadence: Cadence,
    run_id: u64,
    slots: BTreeMap<u64, Slot>,
    /// Next draft index to play. `None` until the first reservation after a reset.
    cursor: Option<u64>,
    current: Option<Playing>,
    generation_complete: bool,
    visible: bool,
    played: u64,
    total: u64,
}

impl<S: PreviewSurface> PreviewPlayer<S> {
    pub fn new(surface: S, cadence: Cadence) -> Self {
        Self {
            surface,
            cadence,
            run_id: 0,
            slots: BTreeMap::new(),
            cursor: None,
            current: None,
            generation_complete: false,
            visible: false,
            played: 0,
            total: 0,
        }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    /// Drafts waiting behind the one being played.
    pub fn buffered(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }

    /// Drafts the current session expects to show, including those already played.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn played(&self) -> u64 {
        self.played
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Apply one event from the engine.
    pub fn handle(&mut self, event: PreviewEvent) {
        match event {
            PreviewEvent::Reserve { base, count } => {
                if self.cursor.is_none() {
                    // Anything buffered below the first reservation is from a cancelled run.
                    self.slots = self.slots.split_off(&base);
                    self.cursor = Some(base);
                }
                self.total += count;
                self.generation_complete = false;
                trace!(base, count, total = self.total, "preview capacity extended");
            }
            PreviewEvent::Draft(entry) => {
                if self.is_behind_cursor(entry.draft_index) {
                    return;
                }
                self.slots.insert(entry.draft_index, Slot::Ready(entry));
            }
            PreviewEvent::Skip { draft_index } => {
                if self.is_behind_cursor(draft_index) {
                    return;
                }
                self.slots.insert(draft_index, Slot::Skipped);
                self.total = self.total.saturating_sub(1);
            }
            PreviewEvent::GenerationComplete => {
                self.generation_complete = true;
            }
            PreviewEvent::Cancel => {
                self.cancel();
                return;
            }
        }

        if self.current.is_none() {
            self.start_next();
        }
        self.maybe_hide();
    }

    /// The timer the driver should arm next, if any.
    ///
    /// Call once per armed timer: each call draws a fresh delay from the cadence.
    pub fn next_tick(&mut self) -> Option<ScheduledTick> {
        let playing = self.current.as_mut()?;
        let delay = match playing.next_char() {
            Some(next) => {
                let pause = self.cadence.pause(playing.prev_char(), next);
                playing.thinking = pause.thinking;
                pause.delay
            }
            None => DWELL,
        };
        if playing.thinking {
            self.render();
        }
        Some(ScheduledTick {
            run_id: self.run_id,
            delay,
        })
    }

    /// Advance playback for a fired timer. Returns `false` for stale ticks.
    pub fn on_tick(&mut self, tick: ScheduledTick) -> bool {
        if tick.run_id != self.run_id {
            trace!(
                tick_run = tick.run_id,
                run_id = self.run_id,
                "stale preview tick ignored"
            );
            return false;
        }
        let Some(playing) = self.current.as_mut() else {
            return false;
        };

        match playing.next_char() {
            Some(c) => {
                playing.revealed += c.len_utf8();
                playing.thinking = false;
                self.render();
            }
            None => {
                self.played += 1;
                self.current = None;
                self.start_next();
                self.maybe_hide();
            }
        }
        true
    }

    fn is_behind_cursor(&self, draft_index: u64) -> bool {
        self.cursor.is_some_and(|cursor| draft_index < cursor)
    }

    fn start_next(&mut self) {
        let Some(mut cursor) = self.cursor else {
            return;
        };
        while let Some(slot) = self.slots.remove(&cursor) {
            cursor += 1;
            if let Slot::Ready(entry) = slot {
                debug!(
                    draft_index = entry.draft_index,
                    contact_id = %entry.target_id,
                    "preview playing draft"
                );
                self.current = Some(Playing {
                    entry,
                    revealed: 0,
                    thinking: false,
                });
                self.visible = true;
                self.cursor = Some(cursor);
                self.render();
                return;
            }
        }
        self.cursor = Some(cursor);
    }

    fn maybe_hide(&mut self) {
        if self.generation_complete && self.current.is_none() && self.slots.is_empty() {
            self.hide();
        }
    }

    fn hide(&mut self) {
        if self.visible {
            self.surface.hide();
            self.visible = false;
        }
        self.played = 0;
        self.total = 0;
        self.generation_complete = false;
    }

    fn cancel(&mut self) {
        self.run_id += 1;
        self.slots.clear();
        self.current = None;
        self.cursor = None;
        debug!(run_id = self.run_id, "preview cancelled");
        self.hide();
    }

    fn render(&mut self) {
        if let Some(playing) = &self.current {
            let frame = PreviewFrame {
                draft_index: playing.entry.draft_index,
                target_id: playing.entry.target_id,
                subject: &playing.entry.subject,
                body: &playing.entry.message[..playing.revealed],
                thinking: playing.thinking,
                position: self.played + 1,
                total: self.total.max(self.played + 1),
            };
            self.surface.render(&frame);
        }
    }
}

/// Run a player on its own task until the event channel closes and playback drains.
///
/// Exactly one timer is armed at a time. Events arriving while a timer is
/// armed do not reset it; a `Cancel` leaves it to fire as a stale no-op.
/// Returns the surface when the task ends.
pub fn spawn_player<S>(
    mut events: mpsc::UnboundedReceiver<PreviewEvent>,
    surface: S,
    cadence: Cadence,
) -> JoinHandle<S>
where
    S: PreviewSurface + 'static,
{
    tokio::spawn(async move {
        let mut player = PreviewPlayer::new(surface, cadence);
        let mut armed: Option<(ScheduledTick, Instant)> = None;
        let mut channel_open = true;

        loop {
            if armed.is_none() {
                armed = player
                    .next_tick()
                    .map(|tick| (tick, Instant::now() + tick.delay));
            }
            if !channel_open && armed.is_none() {
                break;
            }

            let deadline = armed.map(|(_, at)| at);
            tokio::select! {
                event = events.recv(), if channel_open => match event {
                    Some(event) => player.handle(event),
                    None => channel_open = false,
                },
                _ = sleep_until_opt(deadline), if deadline.is_some() => {
                    if let Some((tick, _)) = armed.take() {
                        player.on_tick(tick);
                    }
                }
            }
        }

        player.into_surface()
    })
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
