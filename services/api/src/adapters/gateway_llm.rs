//! services/api/src/adapters/gateway_llm.rs
//!
//! This module contains the adapter for the hosted AI gateway.
//! It implements the `CompletionService` port from the `core` crate by calling the
//! gateway's OpenAI-compatible chat-completions endpoint once per prompt.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use study_assistant_core::{
    ports::{CompletionService, PortResult, UpstreamError},
    prompts::Prompt,
};
use tracing::{debug, error};

//=========================================================================================
// Wire Format
//=========================================================================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatCompletionMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionReply,
}

#[derive(Deserialize)]
struct ChatCompletionReply {
    content: Option<String>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` against the AI gateway.
///
/// A single attempt is made per prompt. Retrying is left to the client, which gets a
/// 429 when the gateway is rate limiting.
#[derive(Clone)]
pub struct AiGatewayAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl AiGatewayAdapter {
    /// Creates a new `AiGatewayAdapter`. `base_url` is the gateway root, e.g. `https://host/v1`.
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model,
        }
    }
}

fn generic(status: Option<u16>, message: impl Into<String>) -> UpstreamError {
    UpstreamError::Generic {
        status,
        message: message.into(),
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for AiGatewayAdapter {
    async fn complete(&self, prompt: &Prompt) -> PortResult<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatCompletionMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatCompletionMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        debug!("Requesting {} completion from {}", prompt.kind, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("AI {} request failed: {}", prompt.kind, e);
                generic(None, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("AI {} error ({}): {}", prompt.kind, status, body);
            return Err(UpstreamError::from_status(status.as_u16(), body).into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("AI {} response could not be decoded: {}", prompt.kind, e);
            generic(Some(status.as_u16()), e.to_string())
        })?;

        // Extract the text content from the first choice in the response.
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                generic(
                    Some(status.as_u16()),
                    format!("AI gateway returned no {} content", prompt.kind),
                )
                .into()
            })
    }
}
