// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System and user prompts for one draft.
//!
//! The system prompt fixes voice, length and the JSON reply shape. The user
//! prompt carries the sender profile, the recipient record and the goal.

use murmur_core::{BlockKind, Contact, DraftSettings, DraftingMode, Identity, OperationSpec};
use serde_json::{Map, Value};

pub fn system_prompt(settings: &DraftSettings, contact: &Contact) -> String {
    let first_name = contact.first_name.as_deref().unwrap_or("there");
    let company = contact.company.as_deref().unwrap_or("their organization");
    format!(
        "You write short, personal outreach emails on behalf of the sender. \
         Address the recipient as {first_name} and refer to {company} naturally. \
         Use a {tone} tone and write exactly {paragraphs} paragraphs. \
         Do not include a signature, a sign-off with the sender's name, or placeholders. \
         Never use em dashes. \
         Reply with only a JSON object of the form {{\"subject\": \"...\", \"message\": \"...\"}}.",
        tone = settings.tone,
        paragraphs = settings.paragraphs,
    )
}

pub fn user_prompt(spec: &OperationSpec, contact: &Contact) -> String {
    let sender = json_subset([
        ("name", Some(spec.identity.name.as_str())),
        ("website", spec.identity.website.as_deref()),
        ("bio", spec.identity.bio.as_deref()),
    ]);
    let recipient = recipient_json(contact);
    format!(
        "Sender information (user profile):\n{sender}\n\n\
         Recipient information:\n{recipient}\n\n\
         User Goal:\n{goal}",
        goal = goal(spec.mode, &spec.settings),
    )
}

fn recipient_json(contact: &Contact) -> String {
    json_subset([
        ("firstName", contact.first_name.as_deref()),
        ("lastName", contact.last_name.as_deref()),
        ("email", contact.email.as_deref()),
        ("company", contact.company.as_deref()),
        ("city", contact.city.as_deref()),
        ("state", contact.state.as_deref()),
        ("country", contact.country.as_deref()),
        ("website", contact.website.as_deref()),
        ("phone", contact.phone.as_deref()),
    ])
}

/// Pretty JSON of the non-empty fields, in the given order.
fn json_subset<const N: usize>(fields: [(&str, Option<&str>); N]) -> String {
    let map: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(k, v)| {
            let v = v?.trim();
            (!v.is_empty()).then(|| (k.to_string(), Value::String(v.to_string())))
        })
        .collect();
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_else(|_| "{}".into())
}

fn goal(mode: DraftingMode, settings: &DraftSettings) -> String {
    match mode {
        DraftingMode::Ai | DraftingMode::Handwritten => {
            settings.automated_prompt().unwrap_or_default().to_string()
        }
        DraftingMode::Hybrid => {
            let mut sections: Vec<String> = settings
                .hybrid_blocks()
                .filter(|b| !b.value.trim().is_empty())
                .map(|b| format!("{}: {}", block_label(b.kind), b.value.trim()))
                .collect();
            if let Some(extra) = settings.hybrid_prompt.as_deref().map(str::trim)
                && !extra.is_empty()
            {
                sections.push(format!("Additional instructions: {extra}"));
            }
            sections.join("\n")
        }
    }
}

fn block_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::FullAutomated => "Goal",
        BlockKind::Introduction => "Introduction",
        BlockKind::Research => "Research",
        BlockKind::Action => "Call to action",
        BlockKind::Text => "Include verbatim",
    }
}

/// Sender name used to strip echoed signatures from replies.
pub fn sender_name(identity: &Identity) -> &str {
    identity.name.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::{OperationId, PromptBlock};

    fn spec(mode: DraftingMode, settings: DraftSettings) -> OperationSpec {
        OperationSpec {
            id: OperationId::new(),
            mode,
            settings,
            identity: Identity {
                name: "Sam".into(),
                website: None,
                bio: Some("Drummer".into()),
            },
            targets: vec![Contact {
                first_name: Some("Ada".into()),
                company: Some("Engines".into()),
                ..Contact::with_id(1)
            }],
        }
    }

    #[test]
    fn system_prompt_carries_tone_and_length() {
        let settings = DraftSettings {
            tone: "casual".into(),
            paragraphs: 2,
            ..DraftSettings::default()
        };
        let prompt = system_prompt(&settings, &Contact::with_id(1));
        assert!(prompt.contains("casual tone"));
        assert!(prompt.contains("exactly 2 paragraphs"));
        assert!(prompt.contains("\"subject\""));
    }

    #[test]
    fn user_prompt_skips_empty_fields() {
        let settings = DraftSettings {
            blocks: vec![PromptBlock::new(BlockKind::FullAutomated, "Book a show")],
            ..DraftSettings::default()
        };
        let spec = spec(DraftingMode::Ai, settings);
        let prompt = user_prompt(&spec, &spec.targets[0]);
        assert!(prompt.contains("\"firstName\": \"Ada\""));
        assert!(!prompt.contains("lastName"));
        assert!(!prompt.contains("website"));
        assert!(prompt.ends_with("User Goal:\nBook a show"));
    }

    #[test]
    fn hybrid_goal_lists_expanded_blocks() {
        let mut collapsed = PromptBlock::new(BlockKind::Research, "hidden");
        collapsed.collapsed = true;
        let settings = DraftSettings {
            blocks: vec![
                PromptBlock::new(BlockKind::Introduction, "Say hi"),
                collapsed,
                PromptBlock::new(BlockKind::Action, "Ask for a call"),
            ],
            hybrid_prompt: Some("Keep it light".into()),
            ..DraftSettings::default()
        };
        assert_eq!(
            goal(DraftingMode::Hybrid, &settings),
            "Introduction: Say hi\nCall to action: Ask for a call\nAdditional instructions: Keep it light"
        );
    }
}
