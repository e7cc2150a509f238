// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `murmur draft` command implementation.
//!
//! Wires SQLite storage, the credit ledger, the OpenRouter backend and the
//! queue controller together, enqueues one operation from JSON input files,
//! and plays finished drafts back in the terminal until the queue goes idle
//! or the user interrupts.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use murmur_config::MurmurConfig;
use murmur_core::{ContactId, DraftingMode, MurmurError};
use murmur_credits::{CreditLedger, Pricing};
use murmur_engine::{
    BatchRunner, GenerationWorker, ModelRotation, PreviewFeed, QueueController,
    install_signal_handler,
};
use murmur_openrouter::OpenRouterBackend;
use murmur_preview::{Cadence, spawn_player};
use murmur_storage::SqliteStore;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::input::FileSource;
use crate::terminal::{StderrNotifier, TerminalSurface};

#[derive(Args, Debug)]
pub struct DraftArgs {
    /// JSON array of contacts.
    #[arg(long)]
    pub contacts: PathBuf,

    /// JSON drafting settings (prompt blocks, tone, subject policy).
    #[arg(long)]
    pub settings: PathBuf,

    /// JSON sender identity.
    #[arg(long)]
    pub identity: PathBuf,

    /// Drafting mode: ai, hybrid or handwritten.
    #[arg(long, default_value = "ai", value_parser = crate::parse_mode)]
    pub mode: DraftingMode,

    /// Only draft for these contact ids (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<i64>,

    /// Skip the typing preview.
    #[arg(long)]
    pub no_preview: bool,
}

/// Runs the `murmur draft` command.
pub async fn run_draft(config: MurmurConfig, args: DraftArgs) -> Result<(), MurmurError> {
    murmur_engine::metrics::register_metrics();

    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    let ledger = CreditLedger::hydrate(store.clone())
        .await?
        .with_low_balance_warning(config.credits.low_balance_warning_units);
    let ledger = Arc::new(tokio::sync::Mutex::new(ledger));

    let backend = OpenRouterBackend::new(&config.openrouter).map_err(|e| {
        error!(error = %e, "failed to initialize OpenRouter backend");
        eprintln!("error: OpenRouter API key required. Set openrouter.api_key or OPENROUTER_API_KEY.");
        e
    })?;

    let worker = GenerationWorker::new(
        Arc::new(backend),
        store.clone(),
        ModelRotation::from_config(&config.models, &config.engine),
    );

    let preview_enabled = config.preview.enabled && !args.no_preview;
    let (feed, player) = if preview_enabled {
        let (tx, rx) = mpsc::unbounded_channel();
        let player = spawn_player(rx, TerminalSurface::stdout(), Cadence::new(&config.preview));
        (PreviewFeed::new(tx), Some(player))
    } else {
        (PreviewFeed::disconnected(), None)
    };

    let runner = BatchRunner::new(
        worker,
        ledger.clone(),
        Pricing::from_config(&config.credits),
        &config.engine,
    )
    .with_feed(feed.clone());
    let controller = QueueController::builder(runner, ledger)
        .feed(feed)
        .notifier(Arc::new(StderrNotifier))
        .build();

    let source = FileSource::new(args.contacts, args.settings, args.identity);
    let selection: Vec<ContactId> = args.select.into_iter().map(ContactId).collect();
    let operation_id = controller
        .enqueue_from(&source, args.mode, Some(selection.as_slice()))
        .await?;
    info!(operation_id = %operation_id, mode = %args.mode, "drafting started");

    // The handler runs cancel_all before tripping `interrupted`.
    let interrupted = install_signal_handler(controller.clone());
    tokio::select! {
        _ = controller.on_idle() => {}
        _ = interrupted.cancelled() => {
            warn!("interrupted, discarding queued work");
        }
    }

    if controller.is_paused() {
        eprintln!(
            "Out of credits ({:.2} remaining). Top up with `murmur credits set` and run again.",
            controller.balance().await
        );
    }

    controller.shutdown().await;
    interrupted.cancel();
    drop(controller);

    // The player exits once every feed handle is gone and playback drains.
    if let Some(player) = player
        && let Err(e) = player.await
    {
        warn!(error = %e, "preview player task failed");
    }

    Ok(())
}
