use thiserror::Error;

use crate::domain::RewriteResult;

pub const ASSISTANT_TITLE: &str = "Writing Assistant";
pub const SUGGESTION_TITLE: &str = "Suggestion";
pub const IMPROVE_BUTTON_LABEL: &str = "Improve Selected Text";
pub const PROFESSIONAL_BUTTON_LABEL: &str = "Make More Professional";
pub const LOADING_MESSAGE: &str = "Getting suggestions...";
pub const APPLY_BUTTON_LABEL: &str = "Apply";
pub const COPY_BUTTON_LABEL: &str = "Copy";
pub const COPIED_BUTTON_LABEL: &str = "Copied!";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Hidden,
    Idle,
    Loading,
    Result {
        suggestion: String,
        copied: bool,
    },
    Error {
        message: String,
    },
}

impl WidgetState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Result { .. } => "result",
            Self::Error { .. } => "error",
        }
    }

    pub fn title(&self) -> Option<&'static str> {
        match self {
            Self::Hidden => None,
            Self::Result { .. } => Some(SUGGESTION_TITLE),
            Self::Idle | Self::Loading | Self::Error { .. } => Some(ASSISTANT_TITLE),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Hidden => String::new(),
            Self::Idle => format!("{IMPROVE_BUTTON_LABEL} | {PROFESSIONAL_BUTTON_LABEL}"),
            Self::Loading => LOADING_MESSAGE.to_string(),
            Self::Result { suggestion, copied } => {
                let copy = if *copied {
                    COPIED_BUTTON_LABEL
                } else {
                    COPY_BUTTON_LABEL
                };
                format!("{suggestion}\n[{APPLY_BUTTON_LABEL}] [{copy}]")
            }
            Self::Error { message } => message.clone(),
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while the widget is {state}")]
pub struct WidgetTransitionError {
    pub action: &'static str,
    pub state: &'static str,
}

/// Rendering-independent widget state machine:
/// `Hidden -> Idle -> Loading -> {Result, Error} -> Hidden`.
#[derive(Debug, Default)]
pub struct AssistantWidget {
    state: WidgetState,
}

impl AssistantWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn suggestion(&self) -> Option<&str> {
        match &self.state {
            WidgetState::Result { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    pub fn show_controls(&mut self) -> Result<(), WidgetTransitionError> {
        self.guard("show controls", !matches!(self.state, WidgetState::Loading))?;
        self.state = WidgetState::Idle;
        Ok(())
    }

    pub fn begin_loading(&mut self) -> Result<(), WidgetTransitionError> {
        self.guard("start a rewrite", matches!(self.state, WidgetState::Idle))?;
        self.state = WidgetState::Loading;
        Ok(())
    }

    /// Errors raised by the page itself, such as missing input text.
    pub fn show_error(&mut self, message: impl Into<String>) -> Result<(), WidgetTransitionError> {
        self.guard(
            "show an error",
            matches!(self.state, WidgetState::Idle | WidgetState::Result { .. }),
        )?;
        self.state = WidgetState::Error {
            message: message.into(),
        };
        Ok(())
    }

    pub fn resolve(&mut self, result: RewriteResult) -> Result<(), WidgetTransitionError> {
        self.guard("resolve a rewrite", matches!(self.state, WidgetState::Loading))?;
        self.state = match result.into_result() {
            Ok(suggestion) => WidgetState::Result {
                suggestion,
                copied: false,
            },
            Err(message) => WidgetState::Error { message },
        };
        Ok(())
    }

    pub fn mark_copied(&mut self) -> Result<(), WidgetTransitionError> {
        match &mut self.state {
            WidgetState::Result { copied, .. } => {
                *copied = true;
                Ok(())
            }
            other => Err(WidgetTransitionError {
                action: "copy",
                state: other.name(),
            }),
        }
    }

    pub fn hide(&mut self) {
        self.state = WidgetState::Hidden;
    }

    fn guard(&self, action: &'static str, allowed: bool) -> Result<(), WidgetTransitionError> {
        if allowed {
            Ok(())
        } else {
            Err(WidgetTransitionError {
                action,
                state: self.state.name(),
            })
        }
    }
}
