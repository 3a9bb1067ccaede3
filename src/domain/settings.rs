use std::fmt;

use serde::{Deserialize, Serialize};

use super::RewriteError;

pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

const ANTHROPIC_KEY_PREFIX: &str = "sk-ant-";
const OPENAI_KEY_PREFIX: &str = "sk-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub id: &'static str,
    pub label: &'static str,
}

const OPENAI_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "gpt-3.5-turbo",
        label: "GPT-3.5 Turbo (Recommended)",
    },
    ModelOption {
        id: "gpt-4o-mini",
        label: "GPT-4o Mini (Faster, cheaper)",
    },
    ModelOption {
        id: "gpt-4o",
        label: "GPT-4o (Most capable)",
    },
    ModelOption {
        id: "gpt-4-turbo",
        label: "GPT-4 Turbo",
    },
    ModelOption {
        id: "gpt-4",
        label: "GPT-4",
    },
];

const ANTHROPIC_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "claude-3-5-sonnet-20241022",
        label: "Claude 3.5 Sonnet (Recommended)",
    },
    ModelOption {
        id: "claude-3-5-haiku-20241022",
        label: "Claude 3.5 Haiku (Fastest, cheapest)",
    },
    ModelOption {
        id: "claude-3-opus-20240229",
        label: "Claude 3 Opus (Most capable)",
    },
    ModelOption {
        id: "claude-3-sonnet-20240229",
        label: "Claude 3 Sonnet",
    },
    ModelOption {
        id: "claude-3-haiku-20240307",
        label: "Claude 3 Haiku",
    },
];

/// The two supported vendors. `Display` renders the vendor name used in
/// messages; [`ProviderKind::as_str`] is the persisted settings value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    pub fn parse(value: &str) -> Result<Self, RewriteError> {
        match value {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(RewriteError::config(format!(
                "Unsupported API provider: {other}"
            ))),
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
            Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }

    pub fn model_catalog(&self) -> &'static [ModelOption] {
        match self {
            Self::OpenAi => OPENAI_MODELS,
            Self::Anthropic => ANTHROPIC_MODELS,
        }
    }

    /// Checks the key prefix the vendor issues. Used when saving settings; the
    /// Anthropic client repeats its own check before every request.
    pub fn validate_api_key_format(&self, api_key: &str) -> Result<(), RewriteError> {
        match self {
            Self::OpenAi if !api_key.starts_with(OPENAI_KEY_PREFIX) => Err(
                RewriteError::validation("OpenAI API keys should start with \"sk-\""),
            ),
            Self::Anthropic if !api_key.starts_with(ANTHROPIC_KEY_PREFIX) => Err(
                RewriteError::validation("Anthropic API keys should start with \"sk-ant-\""),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => f.write_str("OpenAI"),
            Self::Anthropic => f.write_str("Anthropic"),
        }
    }
}

/// Flat key/value settings record. The provider stays a raw string so that an
/// unknown persisted value is reported when a request is dispatched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_key: String,
    pub provider: String,
    pub model: String,
    pub enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            enabled: true,
        }
    }
}

impl Settings {
    pub fn provider_kind(&self) -> Result<ProviderKind, RewriteError> {
        ProviderKind::parse(&self.provider)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn model_or_default(&self, provider: ProviderKind) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            provider.default_model()
        } else {
            model
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<empty>" })
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("enabled", &self.enabled)
            .finish()
    }
}
