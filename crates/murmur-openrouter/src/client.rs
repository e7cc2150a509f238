// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenRouter chat completions API.
//!
//! One request per call. Retrying is the batch runner's job, so the client
//! only classifies failures: rate limits, upstream errors and network
//! failures come back as [`MurmurError::Provider`] (transient), other 4xx
//! statuses as [`MurmurError::Rejected`].

use murmur_core::MurmurError;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Longest error body quoted in an error message.
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: SecretString, base_url: &str) -> Result<Self, MurmurError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MurmurError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Send `request` and return the text of the first choice.
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, MurmurError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| MurmurError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "completion response received");

        let body = response.text().await.map_err(|e| MurmurError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| MurmurError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| MurmurError::Parse("empty completion from OpenRouter".into()))
    }
}

fn classify_failure(status: StatusCode, body: &str) -> MurmurError {
    let detail = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(MAX_ERROR_BODY).collect());
    let message = format!("OpenRouter returned {status}: {detail}");

    if is_transient_status(status) {
        MurmurError::Provider {
            message,
            source: None,
        }
    } else {
        MurmurError::Rejected(message)
    }
}

/// Rate limits, timeouts and server-side failures are worth retrying.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
