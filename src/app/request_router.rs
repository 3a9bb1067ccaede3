use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{RewriteError, RewriteRequest, RewriteResult};
use crate::infra::llm::ProviderClient;
use crate::infra::settings_store::SettingsStore;

pub const API_KEY_NOT_CONFIGURED: &str =
    "API key not configured. Please set up your API key in the extension settings.";

/// Background-side handler for `callLLM` messages. Holds no per-call state;
/// settings are re-read on every request.
#[derive(Clone)]
pub struct RequestRouter {
    settings: Arc<dyn SettingsStore>,
    client: ProviderClient,
}

impl RequestRouter {
    pub fn new(settings: Arc<dyn SettingsStore>, client: ProviderClient) -> Self {
        Self { settings, client }
    }

    pub fn handle(&self, request: &RewriteRequest) -> RewriteResult {
        let result = self.rewrite(request);
        match &result {
            Ok(value) => info!(
                kind = request.kind().as_str(),
                chars = value.chars().count(),
                "rewrite completed"
            ),
            Err(error) => warn!(
                kind = request.kind().as_str(),
                error_kind = ?error.kind(),
                "rewrite failed: {error}"
            ),
        }
        result.into()
    }

    fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError> {
        let settings = self.settings.load()?;
        if !settings.has_api_key() {
            return Err(RewriteError::config(API_KEY_NOT_CONFIGURED));
        }

        debug!(
            provider = %settings.provider,
            kind = request.kind().as_str(),
            "dispatching rewrite request"
        );
        self.client.complete(&request.prompt(), &settings)
    }
}
