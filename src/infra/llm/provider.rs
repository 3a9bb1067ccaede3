use crate::domain::{ProviderKind, RewriteError, Settings};

/// Which side of the bridge a client runs on. Vendors that gate direct
/// browser access need to know when a request leaves a page context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionContext {
    #[default]
    Background,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: u16,
    pub temperature: f32,
}

impl CompletionParams {
    pub const REWRITE: Self = Self {
        max_tokens: 500,
        temperature: 0.7,
    };

    pub const CONNECTION_TEST: Self = Self {
        max_tokens: 50,
        temperature: 0.0,
    };
}

pub trait CompletionProvider: Send + Sync {
    fn provider_kind(&self) -> ProviderKind;

    fn complete_with(
        &self,
        prompt: &str,
        settings: &Settings,
        params: CompletionParams,
    ) -> Result<String, RewriteError>;

    fn complete(&self, prompt: &str, settings: &Settings) -> Result<String, RewriteError> {
        self.complete_with(prompt, settings, CompletionParams::REWRITE)
    }
}
