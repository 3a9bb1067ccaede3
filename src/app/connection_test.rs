use tracing::info;

use crate::domain::{RewriteError, Settings};
use crate::infra::llm::{CompletionParams, ProviderClient};

pub const CONNECTION_TEST_PROMPT: &str = "Please respond with exactly: 'API connection successful'";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTestOutcome {
    Succeeded { response: String },
    Failed { error: RewriteError },
}

impl ConnectionTestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Succeeded { response } => {
                format!("✓ API connection successful! Response: \"{response}\"")
            }
            Self::Failed { error } => format!("✗ API connection failed: {error}"),
        }
    }
}

/// Sends a short fixed prompt with the settings being edited, before they are
/// saved. The client should be built for the page execution context.
pub struct ConnectionTester {
    client: ProviderClient,
}

impl ConnectionTester {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    pub fn run(&self, settings: &Settings) -> ConnectionTestOutcome {
        let result = self.client.complete_with(
            CONNECTION_TEST_PROMPT,
            settings,
            CompletionParams::CONNECTION_TEST,
        );
        match result {
            Ok(response) => {
                info!(provider = %settings.provider, "connection test succeeded");
                ConnectionTestOutcome::Succeeded { response }
            }
            Err(error) => {
                info!(provider = %settings.provider, "connection test failed: {error}");
                ConnectionTestOutcome::Failed { error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{CONNECTION_TEST_PROMPT, ConnectionTester};
    use crate::domain::{ProviderKind, RewriteError, Settings};
    use crate::infra::llm::{CompletionParams, CompletionProvider, ProviderClient};

    struct ScriptedProvider {
        seen: Mutex<Vec<(String, CompletionParams)>>,
        reply: Result<String, RewriteError>,
    }

    impl CompletionProvider for ScriptedProvider {
        fn provider_kind(&self) -> ProviderKind {
            ProviderKind::Anthropic
        }

        fn complete_with(
            &self,
            prompt: &str,
            _settings: &Settings,
            params: CompletionParams,
        ) -> Result<String, RewriteError> {
            self.seen
                .lock()
                .expect("mutex poisoned")
                .push((prompt.to_string(), params));
            self.reply.clone()
        }
    }

    fn tester(reply: Result<String, RewriteError>) -> ConnectionTester {
        let mut client = ProviderClient::new();
        client
            .register(ScriptedProvider {
                seen: Mutex::new(Vec::new()),
                reply,
            })
            .expect("provider registration should succeed");
        ConnectionTester::new(client)
    }

    #[test]
    fn run_reports_vendor_reply() {
        let outcome =
            tester(Ok("API connection successful".to_string())).run(&Settings::default());

        assert!(outcome.is_success());
        assert_eq!(
            outcome.message(),
            "✓ API connection successful! Response: \"API connection successful\""
        );
    }

    #[test]
    fn run_reports_classified_failure() {
        let outcome = tester(Err(RewriteError::RateLimited)).run(&Settings::default());

        assert!(!outcome.is_success());
        assert_eq!(
            outcome.message(),
            "✗ API connection failed: API rate limit exceeded. Please try again later."
        );
    }

    #[test]
    fn run_uses_short_deterministic_params() {
        let provider = std::sync::Arc::new(ScriptedProvider {
            seen: Mutex::new(Vec::new()),
            reply: Ok("ok".to_string()),
        });
        let mut client = ProviderClient::new();
        client
            .register_shared(provider.clone())
            .expect("provider registration should succeed");

        ConnectionTester::new(client).run(&Settings::default());

        let seen = provider.seen.lock().expect("mutex poisoned");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, CONNECTION_TEST_PROMPT);
        assert_eq!(seen[0].1, CompletionParams::CONNECTION_TEST);
    }
}
