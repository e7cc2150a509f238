// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authoritative store for the user's credit balance.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::traits::adapter::PluginAdapter;

/// Reads and overwrites the persisted credit balance.
#[async_trait]
pub trait CreditStore: PluginAdapter {
    async fn read(&self) -> Result<f64, MurmurError>;

    async fn write(&self, balance: f64) -> Result<(), MurmurError>;
}
