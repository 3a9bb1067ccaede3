use thiserror::Error;

use super::ProviderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteErrorKind {
    Config,
    Validation,
    Auth,
    Permission,
    RateLimit,
    Format,
    Network,
    Provider,
}

/// Failure of a rewrite call. `Display` is the text shown to the user, so it is
/// passed across the bridge unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("{message}")]
    Config { message: String },
    #[error("{message}")]
    Validation { message: String },
    #[error("Invalid {provider} API key. Please check your API key in settings.")]
    Auth { provider: ProviderKind },
    #[error("API access forbidden. Please check your API key permissions.")]
    Permission,
    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Invalid response format from {provider} API")]
    InvalidResponse { provider: ProviderKind },
    #[error("Network error. Please check your internet connection.")]
    Network { detail: String },
    #[error("Bad request: {message}")]
    BadRequest { message: String },
    #[error("{provider} API error: {message}")]
    Provider {
        provider: ProviderKind,
        message: String,
    },
}

impl RewriteError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            detail: detail.into(),
        }
    }

    pub fn provider(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> RewriteErrorKind {
        match self {
            Self::Config { .. } => RewriteErrorKind::Config,
            Self::Validation { .. } => RewriteErrorKind::Validation,
            Self::Auth { .. } => RewriteErrorKind::Auth,
            Self::Permission => RewriteErrorKind::Permission,
            Self::RateLimited => RewriteErrorKind::RateLimit,
            Self::InvalidResponse { .. } => RewriteErrorKind::Format,
            Self::Network { .. } => RewriteErrorKind::Network,
            Self::BadRequest { .. } | Self::Provider { .. } => RewriteErrorKind::Provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RewriteError, RewriteErrorKind};
    use crate::domain::ProviderKind;

    #[test]
    fn auth_message_names_the_vendor() {
        assert_eq!(
            RewriteError::Auth {
                provider: ProviderKind::OpenAi
            }
            .to_string(),
            "Invalid OpenAI API key. Please check your API key in settings."
        );
        assert_eq!(
            RewriteError::Auth {
                provider: ProviderKind::Anthropic
            }
            .to_string(),
            "Invalid Anthropic API key. Please check your API key in settings."
        );
    }

    #[test]
    fn status_errors_share_vendor_neutral_messages() {
        assert_eq!(
            RewriteError::Permission.to_string(),
            "API access forbidden. Please check your API key permissions."
        );
        assert_eq!(
            RewriteError::RateLimited.to_string(),
            "API rate limit exceeded. Please try again later."
        );
    }

    #[test]
    fn network_error_hides_transport_detail() {
        let error = RewriteError::network("dns error: no such host");

        assert_eq!(
            error.to_string(),
            "Network error. Please check your internet connection."
        );
        assert_eq!(error.kind(), RewriteErrorKind::Network);
    }

    #[test]
    fn kind_groups_vendor_reported_failures_as_provider_errors() {
        assert_eq!(
            RewriteError::BadRequest {
                message: "max_tokens too large".to_string()
            }
            .kind(),
            RewriteErrorKind::Provider
        );
        assert_eq!(
            RewriteError::provider(ProviderKind::OpenAi, "HTTP 500: Internal Server Error").kind(),
            RewriteErrorKind::Provider
        );
        assert_eq!(
            RewriteError::InvalidResponse {
                provider: ProviderKind::Anthropic
            }
            .kind(),
            RewriteErrorKind::Format
        );
    }

    #[test]
    fn provider_error_prefixes_vendor_name() {
        let error = RewriteError::provider(ProviderKind::Anthropic, "overloaded");
        assert_eq!(error.to_string(), "Anthropic API error: overloaded");
    }
}
