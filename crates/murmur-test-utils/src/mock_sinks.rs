// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording implementations of the draft sink, credit store and notifier.

use async_trait::async_trait;
use murmur_core::{
    AdapterType, ContactId, CreditStore, DraftSink, HealthStatus, MurmurError, NewDraft,
    NotificationSink, OperationId, OperationSummary, PluginAdapter,
};
use tokio::sync::Mutex;

macro_rules! mock_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), MurmurError> {
                Ok(())
            }
        }
    };
}

/// Keeps every draft it is given. Can be told to fail the next few writes.
#[derive(Default)]
pub struct MockDraftSink {
    drafts: Mutex<Vec<NewDraft>>,
    failures_left: Mutex<u32>,
}

impl MockDraftSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` writes with a storage error.
    pub async fn fail_next(&self, n: u32) {
        *self.failures_left.lock().await = n;
    }

    pub async fn drafts(&self) -> Vec<NewDraft> {
        self.drafts.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.drafts.lock().await.len()
    }

    pub async fn count_for(&self, contact: i64) -> usize {
        self.drafts
            .lock()
            .await
            .iter()
            .filter(|d| d.contact_id == ContactId(contact))
            .count()
    }
}

mock_adapter!(MockDraftSink, "mock-draft-sink", AdapterType::DraftSink);

#[async_trait]
impl DraftSink for MockDraftSink {
    async fn create_draft(&self, draft: &NewDraft) -> Result<(), MurmurError> {
        {
            let mut left = self.failures_left.lock().await;
            if *left > 0 {
                *left -= 1;
                return Err(MurmurError::Storage {
                    source: "mock sink write failed".into(),
                });
            }
        }
        self.drafts.lock().await.push(draft.clone());
        Ok(())
    }
}

/// In-memory credit store that records every write.
pub struct MockCreditStore {
    balance: Mutex<f64>,
    writes: Mutex<Vec<f64>>,
}

impl MockCreditStore {
    pub fn new(balance: f64) -> Self {
        Self {
            balance: Mutex::new(balance),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub async fn writes(&self) -> Vec<f64> {
        self.writes.lock().await.clone()
    }

    pub async fn stored(&self) -> f64 {
        *self.balance.lock().await
    }
}

mock_adapter!(MockCreditStore, "mock-credit-store", AdapterType::CreditStore);

#[async_trait]
impl CreditStore for MockCreditStore {
    async fn read(&self) -> Result<f64, MurmurError> {
        Ok(*self.balance.lock().await)
    }

    async fn write(&self, balance: f64) -> Result<(), MurmurError> {
        *self.balance.lock().await = balance;
        self.writes.lock().await.push(balance);
        Ok(())
    }
}

/// Collects operation summaries in delivery order.
#[derive(Default)]
pub struct MockNotifier {
    summaries: Mutex<Vec<(OperationId, OperationSummary)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn summaries(&self) -> Vec<(OperationId, OperationSummary)> {
        self.summaries.lock().await.clone()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.summaries
            .lock()
            .await
            .iter()
            .map(|(_, s)| s.to_string())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for MockNotifier {
    async fn notify(&self, operation_id: &OperationId, summary: &OperationSummary) {
        self.summaries
            .lock()
            .await
            .push((operation_id.clone(), *summary));
    }
}
