mod anthropic;
mod openai;
mod provider;
mod provider_client;
mod response_parsing;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use provider::{CompletionParams, CompletionProvider, ExecutionContext};
pub use provider_client::ProviderClient;
