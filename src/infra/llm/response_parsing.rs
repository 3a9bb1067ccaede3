use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{ProviderKind, RewriteError};

const MAX_ERROR_MESSAGE_LEN: usize = 256;

#[derive(Debug, Deserialize)]
struct VendorErrorEnvelope {
    #[serde(default)]
    error: Option<VendorErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct VendorErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

pub(crate) fn non_empty_trimmed(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The vendor's `error.message`, or `HTTP {status}: {reason}` when the body
/// carries none.
pub(crate) fn vendor_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<VendorErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|detail| detail.message)
        .and_then(|message| non_empty_trimmed(&message))
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
            .trim_end()
            .to_string()
        })
}

pub(crate) fn map_http_error(provider: ProviderKind, status: StatusCode, body: &str) -> RewriteError {
    warn!(
        provider = provider.as_str(),
        status = status.as_u16(),
        body = %truncate_message(body),
        "vendor returned an error response"
    );

    match status {
        StatusCode::UNAUTHORIZED => RewriteError::Auth { provider },
        StatusCode::FORBIDDEN => RewriteError::Permission,
        StatusCode::TOO_MANY_REQUESTS => RewriteError::RateLimited,
        StatusCode::BAD_REQUEST if provider == ProviderKind::Anthropic => {
            RewriteError::BadRequest {
                message: vendor_error_message(status, body),
            }
        }
        _ => RewriteError::provider(provider, vendor_error_message(status, body)),
    }
}

pub(crate) fn map_transport_error(provider: ProviderKind, error: reqwest::Error) -> RewriteError {
    debug!(provider = provider.as_str(), "transport failure: {error}");
    RewriteError::network(error.to_string())
}

pub(crate) fn build_v1_url(api_base_url: &str, endpoint_path: &str) -> String {
    let base = api_base_url.trim_end_matches('/');
    let endpoint_path = endpoint_path.trim_start_matches('/');

    if base.ends_with("/v1") {
        format!("{base}/{endpoint_path}")
    } else {
        format!("{base}/v1/{endpoint_path}")
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{build_v1_url, map_http_error, truncate_message, vendor_error_message};
    use crate::domain::{ProviderKind, RewriteError, RewriteErrorKind};

    #[test]
    fn vendor_error_message_prefers_body_message() {
        let message = vendor_error_message(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"type":"server_error","message":"The server had an error"}}"#,
        );

        assert_eq!(message, "The server had an error");
    }

    #[test]
    fn vendor_error_message_falls_back_to_status_line() {
        assert_eq!(
            vendor_error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>"),
            "HTTP 503: Service Unavailable"
        );
        assert_eq!(
            vendor_error_message(StatusCode::BAD_GATEWAY, r#"{"error":{"message":"  "}}"#),
            "HTTP 502: Bad Gateway"
        );
    }

    #[test]
    fn map_http_error_is_identical_for_both_vendors_on_mapped_statuses() {
        for provider in ProviderKind::ALL {
            assert_eq!(
                map_http_error(provider, StatusCode::UNAUTHORIZED, "{}").kind(),
                RewriteErrorKind::Auth
            );
            assert_eq!(
                map_http_error(provider, StatusCode::FORBIDDEN, "{}").kind(),
                RewriteErrorKind::Permission
            );
            assert_eq!(
                map_http_error(provider, StatusCode::TOO_MANY_REQUESTS, "{}").kind(),
                RewriteErrorKind::RateLimit
            );
        }
    }

    #[test]
    fn map_http_error_reports_anthropic_bad_request_detail() {
        let error = map_http_error(
            ProviderKind::Anthropic,
            StatusCode::BAD_REQUEST,
            r#"{"type":"error","error":{"type":"invalid_request_error","message":"max_tokens: too large"}}"#,
        );

        assert_eq!(error.to_string(), "Bad request: max_tokens: too large");
    }

    #[test]
    fn map_http_error_falls_through_to_provider_error() {
        let error = map_http_error(ProviderKind::OpenAi, StatusCode::BAD_REQUEST, "");

        assert!(matches!(
            error,
            RewriteError::Provider { provider: ProviderKind::OpenAi, ref message }
            if message == "HTTP 400: Bad Request"
        ));
        assert_eq!(error.to_string(), "OpenAI API error: HTTP 400: Bad Request");
    }

    #[test]
    fn truncate_message_compacts_newlines_and_limits_length() {
        assert_eq!(truncate_message("line-1\nline-2"), "line-1 line-2");
        assert_eq!(truncate_message(&"x".repeat(512)).len(), 256);
    }

    #[test]
    fn build_v1_url_avoids_duplicate_v1_segment() {
        assert_eq!(
            build_v1_url("https://api.openai.com/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            build_v1_url("http://127.0.0.1:1234/v1", "messages"),
            "http://127.0.0.1:1234/v1/messages"
        );
    }
}
