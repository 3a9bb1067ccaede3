use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ProviderKind, RewriteError, Settings};
use crate::infra::config::DEFAULT_ANTHROPIC_BASE_URL;

use super::response_parsing::{
    build_v1_url, map_http_error, map_transport_error, non_empty_trimmed,
};
use super::{CompletionParams, CompletionProvider, ExecutionContext};

const PROVIDER: ProviderKind = ProviderKind::Anthropic;
const API_VERSION: &str = "2023-06-01";
const API_KEY_PREFIX: &str = "sk-ant-";
const DIRECT_BROWSER_ACCESS_HEADER: &str = "anthropic-dangerous-direct-browser-access";

pub struct AnthropicProvider {
    api_base_url: String,
    context: ExecutionContext,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(context: ExecutionContext) -> Result<Self, RewriteError> {
        Self::with_config(DEFAULT_ANTHROPIC_BASE_URL, None, context)
    }

    pub fn with_config(
        api_base_url: impl Into<String>,
        timeout: Option<Duration>,
        context: ExecutionContext,
    ) -> Result<Self, RewriteError> {
        let api_base_url = api_base_url.into();
        if api_base_url.trim().is_empty() {
            return Err(RewriteError::config(
                "Anthropic API base URL must not be empty",
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| {
            RewriteError::config(format!("failed to create Anthropic HTTP client: {err}"))
        })?;

        Ok(Self {
            api_base_url,
            context,
            client,
        })
    }

    fn endpoint_url(&self) -> String {
        build_v1_url(&self.api_base_url, "messages")
    }

    fn build_request_payload(
        &self,
        prompt: &str,
        settings: &Settings,
        params: CompletionParams,
    ) -> AnthropicMessagesRequest {
        AnthropicMessagesRequest {
            model: settings.model_or_default(PROVIDER).to_string(),
            max_tokens: params.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: params.temperature,
        }
    }

    fn map_success_response(&self, response_body: &str) -> Result<String, RewriteError> {
        let response: AnthropicMessagesResponse =
            serde_json::from_str(response_body).map_err(|err| {
                debug!("Anthropic response decode failed: {err}");
                RewriteError::InvalidResponse { provider: PROVIDER }
            })?;

        response
            .content
            .first()
            .and_then(|block| block.text.as_deref())
            .and_then(non_empty_trimmed)
            .ok_or(RewriteError::InvalidResponse { provider: PROVIDER })
    }
}

fn validate_api_key(api_key: &str) -> Result<&str, RewriteError> {
    let api_key = api_key.trim();
    if !api_key.starts_with(API_KEY_PREFIX) {
        return Err(RewriteError::validation(
            "Invalid Anthropic API key format. API key should start with \"sk-ant-\"",
        ));
    }
    Ok(api_key)
}

impl CompletionProvider for AnthropicProvider {
    fn provider_kind(&self) -> ProviderKind {
        PROVIDER
    }

    fn complete_with(
        &self,
        prompt: &str,
        settings: &Settings,
        params: CompletionParams,
    ) -> Result<String, RewriteError> {
        let api_key = validate_api_key(&settings.api_key)?;
        let payload = self.build_request_payload(prompt, settings, params);
        debug!(model = %payload.model, context = ?self.context, "sending Anthropic messages request");

        let mut request = self
            .client
            .post(self.endpoint_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json");
        if self.context == ExecutionContext::Page {
            request = request.header(DIRECT_BROWSER_ACCESS_HEADER, "true");
        }

        let response = request
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
struct AnthropicMessagesRequest {
    model: String,
    max_tokens: u16,
    messages: Vec<AnthropicMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicMessagesResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(default)]
    text: Option<String>,
}
