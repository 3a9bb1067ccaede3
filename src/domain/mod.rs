mod errors;
mod rewrite;
mod settings;

pub use errors::{RewriteError, RewriteErrorKind};
pub use rewrite::{
    BRIDGE_FAILURE_MESSAGE, CALL_LLM_ACTION, RewriteKind, RewriteRequest, RewriteResult,
};
pub use settings::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL, DEFAULT_PROVIDER, ModelOption, ProviderKind,
    Settings,
};
