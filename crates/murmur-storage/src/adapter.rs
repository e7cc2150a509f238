// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the draft sink and credit store.

use async_trait::async_trait;
use tracing::debug;

use murmur_config::model::StorageConfig;
use murmur_core::{
    AdapterType, CreditStore, DraftSink, HealthStatus, MurmurError, NewDraft, PluginAdapter,
};

use crate::database::{Database, map_tr_err};
use crate::models::DraftRow;
use crate::queries;

/// SQLite-backed draft sink and credit store sharing one connection.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub async fn open(config: &StorageConfig) -> Result<Self, MurmurError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self { db })
    }

    pub async fn open_in_memory() -> Result<Self, MurmurError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Drafts stored so far, optionally for one operation.
    pub async fn drafts(&self, operation_id: Option<&str>) -> Result<Vec<DraftRow>, MurmurError> {
        queries::drafts::list_drafts(&self.db, operation_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::DraftSink
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("sqlite store checkpointed");
        Ok(())
    }
}

#[async_trait]
impl DraftSink for SqliteStore {
    async fn create_draft(&self, draft: &NewDraft) -> Result<(), MurmurError> {
        let id = queries::drafts::insert_draft(&self.db, draft).await?;
        debug!(
            draft_id = id,
            contact_id = %draft.contact_id,
            operation_id = %draft.operation_id,
            "draft stored"
        );
        Ok(())
    }
}

#[async_trait]
impl CreditStore for SqliteStore {
    async fn read(&self) -> Result<f64, MurmurError> {
        queries::credits::read_balance(&self.db).await
    }

    async fn write(&self, balance: f64) -> Result<(), MurmurError> {
        queries::credits::write_balance(&self.db, balance).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::{ContactId, DraftingMode, OperationId};

    #[tokio::test]
    async fn store_round_trip_through_traits() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("murmur.db").display().to_string(),
            wal_mode: true,
        };
        let store = SqliteStore::open(&config).await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);

        let op = OperationId::new();
        store
            .create_draft(&NewDraft {
                operation_id: op.clone(),
                contact_id: ContactId(4),
                email: None,
                subject: "Hi".to_string(),
                message: "Body".to_string(),
                mode: DraftingMode::Ai,
                font: "Georgia".to_string(),
                signature: Some("Cheers".to_string()),
            })
            .await
            .unwrap();
        let rows = store.drafts(Some(&op.0)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].font, "Georgia");
        assert_eq!(rows[0].signature.as_deref(), Some("Cheers"));

        CreditStore::write(&store, 7.5).await.unwrap();
        assert_eq!(CreditStore::read(&store).await.unwrap(), 7.5);

        store.shutdown().await.unwrap();
    }
}
