// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `murmur credits` command implementation.

use murmur_config::MurmurConfig;
use murmur_core::{CreditStore, MurmurError};
use murmur_storage::SqliteStore;

pub async fn show(config: &MurmurConfig) -> Result<(), MurmurError> {
    let store = SqliteStore::open(&config.storage).await?;
    let balance = store.read().await?;
    println!("{balance:.2} credits");
    Ok(())
}

pub async fn set(config: &MurmurConfig, balance: f64) -> Result<(), MurmurError> {
    if !balance.is_finite() || balance < 0.0 {
        return Err(MurmurError::Config(format!(
            "credit balance must be a non-negative number, got {balance}"
        )));
    }
    let store = SqliteStore::open(&config.storage).await?;
    store.write(balance).await?;
    println!("balance set to {balance:.2} credits");
    Ok(())
}
