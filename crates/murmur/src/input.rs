// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON files as a [`DraftSource`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use murmur_core::{Contact, DraftSettings, DraftSource, Identity, MurmurError};
use serde::de::DeserializeOwned;

/// Contacts, settings and sender identity read from JSON files on each call.
#[derive(Debug, Clone)]
pub struct FileSource {
    contacts: PathBuf,
    settings: PathBuf,
    identity: PathBuf,
}

impl FileSource {
    pub fn new(contacts: PathBuf, settings: PathBuf, identity: PathBuf) -> Self {
        Self {
            contacts,
            settings,
            identity,
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MurmurError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MurmurError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| MurmurError::Config(format!("invalid JSON in {}: {e}", path.display())))
}

#[async_trait]
impl DraftSource for FileSource {
    async fn identity(&self) -> Result<Identity, MurmurError> {
        read_json(&self.identity).await
    }

    async fn settings(&self) -> Result<DraftSettings, MurmurError> {
        read_json(&self.settings).await
    }

    async fn targets(&self) -> Result<Vec<Contact>, MurmurError> {
        read_json(&self.contacts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_contacts_and_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = dir.path().join("contacts.json");
        let identity = dir.path().join("identity.json");
        std::fs::write(
            &contacts,
            r#"[{"id": 7, "firstName": "Ada", "email": "ada@example.com"}]"#,
        )
        .unwrap();
        std::fs::write(&identity, "{ not json").unwrap();

        let source = FileSource::new(contacts, dir.path().join("missing.json"), identity);
        let targets = source.targets().await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].first_name.as_deref(), Some("Ada"));

        let err = source.identity().await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "got: {err}");
        let err = source.settings().await.unwrap_err();
        assert!(err.to_string().contains("cannot read"), "got: {err}");
    }
}
