use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{ProviderKind, RewriteError, Settings};
use crate::infra::config::ProviderEndpoints;

use super::{
    AnthropicProvider, CompletionParams, CompletionProvider, ExecutionContext, OpenAiProvider,
};

/// Dispatches a prompt to whichever vendor the settings name.
#[derive(Default, Clone)]
pub struct ProviderClient {
    providers: HashMap<ProviderKind, Arc<dyn CompletionProvider>>,
}

impl ProviderClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vendor_providers(
        endpoints: &ProviderEndpoints,
        context: ExecutionContext,
    ) -> Result<Self, RewriteError> {
        let mut client = Self::new();
        client.register(OpenAiProvider::with_config(
            endpoints.openai_base_url.clone(),
            endpoints.timeout,
        )?)?;
        client.register(AnthropicProvider::with_config(
            endpoints.anthropic_base_url.clone(),
            endpoints.timeout,
            context,
        )?)?;
        Ok(client)
    }

    pub fn register<P>(&mut self, provider: P) -> Result<(), RewriteError>
    where
        P: CompletionProvider + 'static,
    {
        self.register_shared(Arc::new(provider))
    }

    pub fn register_shared(
        &mut self,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<(), RewriteError> {
        let kind = provider.provider_kind();
        if self.providers.contains_key(&kind) {
            return Err(RewriteError::config(format!(
                "provider '{}' is already registered",
                kind.as_str()
            )));
        }

        self.providers.insert(kind, provider);
        Ok(())
    }

    pub fn resolve(&self, kind: ProviderKind) -> Result<Arc<dyn CompletionProvider>, RewriteError> {
        self.providers.get(&kind).map(Arc::clone).ok_or_else(|| {
            RewriteError::config(format!("Unsupported API provider: {}", kind.as_str()))
        })
    }

    pub fn complete(&self, prompt: &str, settings: &Settings) -> Result<String, RewriteError> {
        self.complete_with(prompt, settings, CompletionParams::REWRITE)
    }

    pub fn complete_with(
        &self,
        prompt: &str,
        settings: &Settings,
        params: CompletionParams,
    ) -> Result<String, RewriteError> {
        let kind = settings.provider_kind()?;
        self.resolve(kind)?.complete_with(prompt, settings, params)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::ProviderClient;
    use crate::domain::{ProviderKind, RewriteError, Settings};
    use crate::infra::config::ProviderEndpoints;
    use crate::infra::llm::{CompletionParams, CompletionProvider, ExecutionContext};

    struct EchoProvider {
        kind: ProviderKind,
        seen_params: Mutex<Vec<CompletionParams>>,
    }

    impl EchoProvider {
        fn new(kind: ProviderKind) -> Self {
            Self {
                kind,
                seen_params: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionProvider for EchoProvider {
        fn provider_kind(&self) -> ProviderKind {
            self.kind
        }

        fn complete_with(
            &self,
            prompt: &str,
            _settings: &Settings,
            params: CompletionParams,
        ) -> Result<String, RewriteError> {
            self.seen_params.lock().expect("lock").push(params);
            Ok(format!("{}:{prompt}", self.kind.as_str()))
        }
    }

    fn settings(provider: &str) -> Settings {
        Settings {
            api_key: "sk-ant-abc".to_string(),
            provider: provider.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn complete_dispatches_on_settings_provider() {
        let mut client = ProviderClient::new();
        client
            .register(EchoProvider::new(ProviderKind::OpenAi))
            .expect("openai registration should succeed");
        client
            .register(EchoProvider::new(ProviderKind::Anthropic))
            .expect("anthropic registration should succeed");

        assert_eq!(
            client.complete("hi", &settings("openai")).expect("openai"),
            "openai:hi"
        );
        assert_eq!(
            client
                .complete("hi", &settings("anthropic"))
                .expect("anthropic"),
            "anthropic:hi"
        );
    }

    #[test]
    fn len_tracks_registered_providers() {
        let mut client = ProviderClient::new();
        assert!(client.is_empty());

        client
            .register(EchoProvider::new(ProviderKind::OpenAi))
            .expect("registration should succeed");

        assert!(!client.is_empty());
        assert_eq!(client.len(), 1);
    }

    #[test]
    fn complete_rejects_unknown_provider_value() {
        let client = ProviderClient::new();

        let error = client
            .complete("hi", &settings("gemini"))
            .expect_err("unknown provider should fail");

        assert_eq!(error.to_string(), "Unsupported API provider: gemini");
    }

    #[test]
    fn resolve_reports_missing_registration() {
        let client = ProviderClient::new();

        let error = client
            .resolve(ProviderKind::OpenAi)
            .err()
            .expect("unregistered provider should fail");

        assert_eq!(error.to_string(), "Unsupported API provider: openai");
    }

    #[test]
    fn register_rejects_duplicate_provider() {
        let mut client = ProviderClient::new();
        client
            .register(EchoProvider::new(ProviderKind::Anthropic))
            .expect("first registration should succeed");

        let error = client
            .register(EchoProvider::new(ProviderKind::Anthropic))
            .expect_err("duplicate registration should fail");

        assert!(matches!(
            error,
            RewriteError::Config { message }
            if message == "provider 'anthropic' is already registered"
        ));
    }

    #[test]
    fn with_vendor_providers_registers_both_vendors() {
        let client = ProviderClient::with_vendor_providers(
            &ProviderEndpoints::default(),
            ExecutionContext::Background,
        )
        .expect("client should build");

        assert_eq!(client.len(), 2);
        for kind in ProviderKind::ALL {
            assert_eq!(
                client.resolve(kind).expect("vendor should resolve").provider_kind(),
                kind
            );
        }
    }
}
