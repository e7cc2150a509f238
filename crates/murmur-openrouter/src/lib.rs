// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenRouter generation backend for Murmur.
//!
//! Implements [`GenerationBackend`] on top of the OpenRouter chat completions
//! API. Each call renders a system and user prompt for one contact, sends a
//! single non-streaming request to the model chosen by the engine, and parses
//! the reply into a subject and message.

pub mod client;
pub mod parse;
pub mod prompt;
pub mod types;

use async_trait::async_trait;
use murmur_config::model::OpenRouterConfig;
use murmur_core::error::MurmurError;
use murmur_core::traits::{GenerationBackend, PluginAdapter};
use murmur_core::types::{AdapterType, GeneratedDraft, GenerationRequest, HealthStatus};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::OpenRouterClient;
use crate::types::{ChatMessage, ChatRequest};

const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
const TOP_P: f64 = 0.95;

/// OpenRouter backend implementing [`GenerationBackend`].
///
/// API key resolution order: config -> `OPENROUTER_API_KEY` env var -> error.
pub struct OpenRouterBackend {
    client: OpenRouterClient,
    temperature: f64,
    max_tokens: u32,
}

impl OpenRouterBackend {
    pub fn new(config: &OpenRouterConfig) -> Result<Self, MurmurError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = OpenRouterClient::new(SecretString::from(api_key), &config.base_url)?;

        info!(base_url = %config.base_url, "OpenRouter backend initialized");

        Ok(Self {
            client,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn to_chat_request(&self, request: &GenerationRequest) -> ChatRequest {
        let contact = request.contact();
        ChatRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage::system(prompt::system_prompt(&request.spec.settings, contact)),
                ChatMessage::user(prompt::user_prompt(&request.spec, contact)),
            ],
            temperature: self.temperature,
            top_p: TOP_P,
            max_tokens: self.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenRouterBackend {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, MurmurError> {
        // No probe request; completions are billed.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MurmurError> {
        debug!("OpenRouter backend shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for OpenRouterBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedDraft, MurmurError> {
        let chat = self.to_chat_request(request);
        debug!(
            model = %chat.model,
            contact_id = request.contact().id.0,
            attempt = request.attempt,
            "requesting draft"
        );

        let text = tokio::select! {
            _ = cancel.cancelled() => return Err(MurmurError::Cancelled),
            result = self.client.complete(&chat) => result?,
        };

        parse::parse_draft_response(&text, prompt::sender_name(&request.spec.identity))
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, MurmurError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV).map_err(|_| {
        MurmurError::Config(format!(
            "OpenRouter API key not found. Set openrouter.api_key in config or {API_KEY_ENV}."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use murmur_core::types::{DraftingMode, OperationId, OperationSpec};
    use murmur_test_utils::{ai_settings, contacts, identity};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(base_url: &str) -> OpenRouterBackend {
        OpenRouterBackend::new(&OpenRouterConfig {
            api_key: Some("sk-or-test".into()),
            base_url: base_url.into(),
            ..OpenRouterConfig::default()
        })
        .unwrap()
    }

    fn request(model: &str) -> GenerationRequest {
        GenerationRequest {
            spec: Arc::new(OperationSpec {
                id: OperationId::new(),
                mode: DraftingMode::Ai,
                settings: ai_settings(),
                identity: identity(),
                targets: contacts(2),
            }),
            position: 1,
            attempt: 0,
            model: model.into(),
        }
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(resolve_api_key(&Some("sk-or-1".into())).unwrap(), "sk-or-1");
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        let result = resolve_api_key(&None);
        // Passes either way depending on whether the env var is set.
        if let Err(err) = result {
            assert!(err.to_string().contains("API key not found"), "got: {err}");
        }
    }

    #[test]
    fn chat_request_targets_the_requested_contact() {
        let backend = backend("http://localhost");
        let chat = backend.to_chat_request(&request("model-b"));
        assert_eq!(chat.model, "model-b");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert!(chat.messages[1].content.contains("Contact1"));
        assert!(!chat.stream);
        assert_eq!(chat.top_p, 0.95);
    }

    #[tokio::test]
    async fn generate_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"model": "model-a"})))
            .respond_with(reply(
                r#"{"subject": "Quick idea", "message": "Hi Contact1,\n\nBest,\nSam Sender"}"#,
            ))
            .mount(&server)
            .await;

        let draft = backend(&server.uri())
            .generate(&request("model-a"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(draft.subject, "Quick idea");
        assert_eq!(draft.message, "Hi Contact1,");
    }

    #[tokio::test]
    async fn unparseable_reply_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("I cannot help with that."))
            .mount(&server)
            .await;

        let err = backend(&server.uri())
            .generate(&request("model-a"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MurmurError::Parse(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn cancelled_request_returns_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("{}").set_delay(std::time::Duration::from_secs(30)))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = backend(&server.uri())
            .generate(&request("model-a"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, MurmurError::Cancelled));
    }
}
