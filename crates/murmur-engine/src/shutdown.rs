// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal-driven cancellation.
//!
//! SIGINT (Ctrl+C) or SIGTERM cancels everything on the controller and trips
//! the returned [`CancellationToken`] so the caller can stop waiting.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::controller::QueueController;

/// Spawn a task that cancels all drafting when a termination signal arrives.
///
/// Cancelling the returned token from elsewhere retires the handler without
/// touching the controller.
pub fn install_signal_handler(controller: QueueController) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = token_clone.cancelled() => {
                debug!("signal handler retired");
                return;
            }
            _ = wait_for_signal() => {}
        }
        controller.cancel_all();
        token_clone.cancel();
    });

    token
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), cancelling drafting"),
                    _ = sigterm.recv() => info!("received SIGTERM, cancelling drafting"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                let _ = ctrl_c.await;
                info!("received SIGINT (Ctrl+C), cancelling drafting");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received Ctrl+C, cancelling drafting");
    }
}
