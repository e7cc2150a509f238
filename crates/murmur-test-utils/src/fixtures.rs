// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contacts, settings and identities for tests.

use async_trait::async_trait;
use murmur_core::{
    BlockKind, Contact, DraftSettings, DraftSource, Identity, MurmurError, PromptBlock,
};

/// `n` contacts with ids `0..n` and a first name and email each.
pub fn contacts(n: usize) -> Vec<Contact> {
    (0..n as i64)
        .map(|id| Contact {
            first_name: Some(format!("Contact{id}")),
            email: Some(format!("contact{id}@example.com")),
            company: Some("Example Co".into()),
            ..Contact::with_id(id)
        })
        .collect()
}

pub fn identity() -> Identity {
    Identity {
        name: "Sam Sender".into(),
        website: Some("https://sender.example".into()),
        bio: Some("Builds things.".into()),
    }
}

/// Settings accepted by `ai` mode: one automated prompt, three paragraphs.
pub fn ai_settings() -> DraftSettings {
    DraftSettings {
        blocks: vec![PromptBlock::new(
            BlockKind::FullAutomated,
            "Introduce our product and ask for a short call.",
        )],
        ..DraftSettings::default()
    }
}

/// Settings accepted by `hybrid` mode.
pub fn hybrid_settings() -> DraftSettings {
    DraftSettings {
        blocks: vec![
            PromptBlock::new(BlockKind::Introduction, "Mention our shared city."),
            PromptBlock::new(BlockKind::Action, "Ask for a reply."),
        ],
        ..DraftSettings::default()
    }
}

/// Settings accepted by `handwritten` mode.
pub fn handwritten_settings() -> DraftSettings {
    DraftSettings {
        ai_subject: false,
        subject: Some("Hello from {{senderName}}".into()),
        blocks: vec![
            PromptBlock::new(BlockKind::Text, "Hi {{firstName}},"),
            PromptBlock::new(BlockKind::Text, "Saw what {{company}} is doing."),
        ],
        ..DraftSettings::default()
    }
}

/// A [`DraftSource`] over fixed values.
#[derive(Debug, Clone)]
pub struct StaticSource {
    pub identity: Identity,
    pub settings: DraftSettings,
    pub targets: Vec<Contact>,
}

impl StaticSource {
    pub fn new(settings: DraftSettings, targets: Vec<Contact>) -> Self {
        Self {
            identity: identity(),
            settings,
            targets,
        }
    }
}

#[async_trait]
impl DraftSource for StaticSource {
    async fn identity(&self) -> Result<Identity, MurmurError> {
        Ok(self.identity.clone())
    }

    async fn settings(&self) -> Result<DraftSettings, MurmurError> {
        Ok(self.settings.clone())
    }

    async fn targets(&self) -> Result<Vec<Contact>, MurmurError> {
        Ok(self.targets.clone())
    }
}
