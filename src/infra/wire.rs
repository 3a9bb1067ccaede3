use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    BRIDGE_FAILURE_MESSAGE, CALL_LLM_ACTION, RewriteKind, RewriteRequest, RewriteResult,
};

pub const CALL_LLM_REQUEST_JSON_SCHEMA: &str = r#"
{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["action", "text"],
  "properties": {
    "action": {
      "const": "callLLM"
    },
    "text": {
      "type": "string",
      "minLength": 1
    }
  }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("message JSON decode failed: {message}")]
    Decode { message: String },
    #[error("message schema validation failed: {details}")]
    Schema { details: String },
    #[error("{message}")]
    Rejected { message: String },
    #[error("internal wire error: {message}")]
    Internal { message: String },
}

/// Page-to-background message. Fields beyond these are ignored. `type` is
/// kept as raw JSON since any value it carries other than a known kind
/// name means `improve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    pub action: String,
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
}

impl WireRequest {
    pub fn call_llm(request: &RewriteRequest) -> Self {
        Self {
            action: CALL_LLM_ACTION.to_string(),
            text: request.text().to_string(),
            kind: Some(Value::String(request.kind().as_str().to_string())),
        }
    }

    pub fn into_rewrite_request(self) -> Result<RewriteRequest, WireError> {
        let kind = match &self.kind {
            Some(Value::String(name)) => RewriteKind::from_wire(name),
            _ => RewriteKind::default(),
        };
        RewriteRequest::new(self.text, kind).map_err(|error| WireError::Rejected {
            message: error.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RewriteResult> for WireResponse {
    fn from(result: &RewriteResult) -> Self {
        Self {
            success: result.is_success(),
            result: result.value().map(str::to_string),
            error: result.error().map(str::to_string),
        }
    }
}

impl From<WireResponse> for RewriteResult {
    fn from(response: WireResponse) -> Self {
        match (response.success, response.result, response.error) {
            (true, Some(value), _) => RewriteResult::success(value),
            (_, _, Some(error)) => RewriteResult::failure(error),
            _ => RewriteResult::failure(BRIDGE_FAILURE_MESSAGE),
        }
    }
}

pub struct WireCodec {
    request_schema: JSONSchema,
}

impl WireCodec {
    pub fn new() -> Result<Self, WireError> {
        let schema: Value =
            serde_json::from_str(CALL_LLM_REQUEST_JSON_SCHEMA).map_err(|err| {
                WireError::Internal {
                    message: format!("invalid built-in request schema: {err}"),
                }
            })?;
        let request_schema = JSONSchema::compile(&schema).map_err(|err| WireError::Internal {
            message: format!("failed to compile request schema: {err}"),
        })?;
        Ok(Self { request_schema })
    }

    pub fn decode_request(&self, message_json: &str) -> Result<RewriteRequest, WireError> {
        let value: Value = serde_json::from_str(message_json).map_err(|err| WireError::Decode {
            message: err.to_string(),
        })?;
        self.decode_request_value(value)
    }

    pub fn decode_request_value(&self, message: Value) -> Result<RewriteRequest, WireError> {
        self.request_schema
            .validate(&message)
            .map_err(schema_validation_error)?;

        let request: WireRequest =
            serde_json::from_value(message).map_err(|err| WireError::Decode {
                message: err.to_string(),
            })?;
        request.into_rewrite_request()
    }

    pub fn encode_request(&self, request: &RewriteRequest) -> Result<String, WireError> {
        serde_json::to_string(&WireRequest::call_llm(request)).map_err(|err| WireError::Internal {
            message: format!("request encode failed: {err}"),
        })
    }

    pub fn encode_response(&self, result: &RewriteResult) -> Result<String, WireError> {
        serde_json::to_string(&WireResponse::from(result)).map_err(|err| WireError::Internal {
            message: format!("response encode failed: {err}"),
        })
    }

    pub fn decode_response(&self, response_json: &str) -> Result<RewriteResult, WireError> {
        let response: WireResponse =
            serde_json::from_str(response_json).map_err(|err| WireError::Decode {
                message: err.to_string(),
            })?;
        Ok(response.into())
    }
}

fn schema_validation_error<'a, I>(errors: I) -> WireError
where
    I: IntoIterator<Item = jsonschema::ValidationError<'a>>,
{
    let details = errors
        .into_iter()
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    WireError::Schema { details }
}
