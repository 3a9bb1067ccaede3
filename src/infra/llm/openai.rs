use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ProviderKind, RewriteError, Settings};
use crate::infra::config::DEFAULT_OPENAI_BASE_URL;

use super::response_parsing::{
    build_v1_url, map_http_error, map_transport_error, non_empty_trimmed,
};
use super::{CompletionParams, CompletionProvider};

const PROVIDER: ProviderKind = ProviderKind::OpenAi;

pub struct OpenAiProvider {
    api_base_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new() -> Result<Self, RewriteError> {
        Self::with_config(DEFAULT_OPENAI_BASE_URL, None)
    }

    pub fn with_config(
        api_base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, RewriteError> {
        let api_base_url = api_base_url.into();
        if api_base_url.trim().is_empty() {
            return Err(RewriteError::config("OpenAI API base URL must not be empty"));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| {
            RewriteError::config(format!("failed to create OpenAI HTTP client: {err}"))
        })?;

        Ok(Self {
            api_base_url,
            client,
        })
    }

    fn endpoint_url(&self) -> String {
        build_v1_url(&self.api_base_url, "chat/completions")
    }

    fn build_request_payload(
        &self,
        prompt: &str,
        settings: &Settings,
        params: CompletionParams,
    ) -> OpenAiChatRequest {
        OpenAiChatRequest {
            model: settings.model_or_default(PROVIDER).to_string(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }

    fn map_success_response(&self, response_body: &str) -> Result<String, RewriteError> {
        let response: OpenAiChatResponse = serde_json::from_str(response_body).map_err(|err| {
            debug!("OpenAI response decode failed: {err}");
            RewriteError::InvalidResponse { provider: PROVIDER }
        })?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .and_then(non_empty_trimmed)
            .ok_or(RewriteError::InvalidResponse { provider: PROVIDER })
    }
}

impl CompletionProvider for OpenAiProvider {
    fn provider_kind(&self) -> ProviderKind {
        PROVIDER
    }

    fn complete_with(
        &self,
        prompt: &str,
        settings: &Settings,
        params: CompletionParams,
    ) -> Result<String, RewriteError> {
        let payload = self.build_request_payload(prompt, settings, params);
        debug!(model = %payload.model, "sending OpenAI chat completion request");

        let response = self
            .client
            .post(self.endpoint_url())
            .bearer_auth(settings.api_key.trim())
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .map_err(|err| map_transport_error(PROVIDER, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(map_http_error(PROVIDER, status, &body));
        }

        let response_body = response
            .text()
            .map_err(|err| map_transport_error(PROVIDER, err))?;
        self.map_success_response(&response_body)
    }
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u16,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    #[serde(default)]
    message: Option<OpenAiChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
