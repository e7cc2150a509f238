// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live typing preview for generated drafts.
//!
//! Drafts arrive on a one-way channel from the engine and are typed out one
//! character at a time with a human-like cadence, strictly in draft-index
//! order. The player never talks back to the engine: it only ever lags it.

pub mod cadence;
pub mod player;
pub mod surface;

pub use cadence::{Cadence, Pause};
pub use player::{PreviewPlayer, ScheduledTick, spawn_player};
pub use surface::{PreviewFrame, PreviewSurface};
