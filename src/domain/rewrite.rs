use super::RewriteError;

pub const CALL_LLM_ACTION: &str = "callLLM";

/// Shown when a call never got an answer from the background side.
pub const BRIDGE_FAILURE_MESSAGE: &str = "Failed to get suggestions. Please try again.";

const IMPROVE_TEMPLATE: &str = "Please improve the following text by making it clearer, more concise, and better structured. Keep the same meaning and tone. Only return the improved text without any additional commentary:\n\n";
const PROFESSIONAL_TEMPLATE: &str = "Please rewrite the following text in a more professional tone while keeping the same meaning. Only return the rewritten text without any additional commentary:\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RewriteKind {
    #[default]
    Improve,
    Professional,
}

impl RewriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improve => "improve",
            Self::Professional => "professional",
        }
    }

    /// Unrecognized kinds fall back to `improve`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "professional" => Self::Professional,
            _ => Self::Improve,
        }
    }

    pub fn build_prompt(&self, text: &str) -> String {
        let template = match self {
            Self::Improve => IMPROVE_TEMPLATE,
            Self::Professional => PROFESSIONAL_TEMPLATE,
        };
        format!("{template}{text}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    text: String,
    kind: RewriteKind,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>, kind: RewriteKind) -> Result<Self, RewriteError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RewriteError::validation("text must not be empty"));
        }
        Ok(Self { text, kind })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> RewriteKind {
        self.kind
    }

    pub fn prompt(&self) -> String {
        self.kind.build_prompt(&self.text)
    }
}

/// Outcome returned across the bridge. Exactly one of value or error is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    outcome: Result<String, String>,
}

impl RewriteResult {
    pub fn success(value: impl Into<String>) -> Self {
        Self {
            outcome: Ok(value.into()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            outcome: Err(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn value(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }

    pub fn into_result(self) -> Result<String, String> {
        self.outcome
    }
}

impl From<Result<String, RewriteError>> for RewriteResult {
    fn from(result: Result<String, RewriteError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(error.to_string()),
        }
    }
}
