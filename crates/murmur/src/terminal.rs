// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering for the live preview and operation summaries.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;
use colored::Colorize;
use murmur_core::{NotificationSink, OperationId, OperationSummary};
use murmur_preview::{PreviewFrame, PreviewSurface};
use tracing::info;

const ELLIPSIS: &str = "…";

/// Appends revealed text to a terminal as it is typed.
///
/// Frames only ever extend the body of the current draft, so each render
/// writes the new suffix. A new draft index starts a new block with a header.
pub struct TerminalSurface<W> {
    out: W,
    color: bool,
    current: Option<u64>,
    printed: usize,
    thinking_shown: bool,
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        let color = std::io::stdout().is_terminal();
        Self::new(std::io::stdout(), color)
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            current: None,
            printed: 0,
            thinking_shown: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn erase_ellipsis(&mut self) {
        if self.thinking_shown {
            let _ = write!(self.out, "\u{8} \u{8}");
            self.thinking_shown = false;
        }
    }

    fn start_draft(&mut self, frame: &PreviewFrame<'_>) {
        if self.current.is_some() {
            let _ = write!(self.out, "\n\n");
        }
        let header = format!("[{}/{}] {}", frame.position, frame.total, frame.subject);
        let _ = if self.color {
            writeln!(self.out, "{}", header.bold())
        } else {
            writeln!(self.out, "{header}")
        };
        self.current = Some(frame.draft_index);
        self.printed = 0;
    }
}

impl<W: Write + Send> PreviewSurface for TerminalSurface<W> {
    fn render(&mut self, frame: &PreviewFrame<'_>) {
        self.erase_ellipsis();
        if self.current != Some(frame.draft_index) {
            self.start_draft(frame);
        }
        if frame.body.len() > self.printed && frame.body.is_char_boundary(self.printed) {
            let _ = write!(self.out, "{}", &frame.body[self.printed..]);
            self.printed = frame.body.len();
        }
        if frame.thinking {
            let _ = write!(self.out, "{ELLIPSIS}");
            self.thinking_shown = true;
        }
        let _ = self.out.flush();
    }

    fn hide(&mut self) {
        self.erase_ellipsis();
        if self.current.take().is_some() {
            let _ = writeln!(self.out);
        }
        self.printed = 0;
        let _ = self.out.flush();
    }
}

/// Prints each finished operation's summary to stderr.
#[derive(Debug, Default)]
pub struct StderrNotifier;

#[async_trait]
impl NotificationSink for StderrNotifier {
    async fn notify(&self, operation_id: &OperationId, summary: &OperationSummary) {
        info!(operation_id = %operation_id, summary = %summary, "operation finished");
        let line = summary.to_string();
        let line = match summary {
            OperationSummary::AllDrafted { .. } => line.green(),
            OperationSummary::Failed { .. } => line.red(),
            _ => line.yellow(),
        };
        eprintln!("{line}");
    }
}
