// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering target for the preview player.

use murmur_core::ContactId;

/// What the preview currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFrame<'a> {
    pub draft_index: u64,
    pub target_id: ContactId,
    pub subject: &'a str,
    /// The part of the message revealed so far.
    pub body: &'a str,
    /// A long pause is in progress; show an ellipsis.
    pub thinking: bool,
    /// One-based position of this draft within the current preview session.
    pub position: u64,
    /// Drafts the current session expects to show.
    pub total: u64,
}

/// Something that can display preview frames (a terminal, a UI widget, a test recorder).
pub trait PreviewSurface: Send {
    fn render(&mut self, frame: &PreviewFrame<'_>);

    fn hide(&mut self);
}
