use std::sync::Arc;

use tracing::info;

use crate::infra::settings_store::{SettingsStore, SettingsStoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantStatus {
    Ready,
    ApiKeyRequired,
}

impl AssistantStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::ApiKeyRequired => "API key required",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: AssistantStatus,
    pub enabled: bool,
    pub provider: String,
    pub model: String,
}

impl StatusSnapshot {
    pub fn toggle_label(&self) -> &'static str {
        if self.enabled {
            "Disable Assistant"
        } else {
            "Enable Assistant"
        }
    }
}

/// Popup view over the settings store.
pub struct StatusView {
    settings: Arc<dyn SettingsStore>,
}

impl StatusView {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub fn snapshot(&self) -> Result<StatusSnapshot, SettingsStoreError> {
        let settings = self.settings.load()?;
        Ok(StatusSnapshot {
            status: if settings.has_api_key() {
                AssistantStatus::Ready
            } else {
                AssistantStatus::ApiKeyRequired
            },
            enabled: settings.enabled,
            provider: settings.provider,
            model: settings.model,
        })
    }

    pub fn toggle(&self) -> Result<StatusSnapshot, SettingsStoreError> {
        let updated = self
            .settings
            .update(&|settings| settings.enabled = !settings.enabled)?;
        info!(enabled = updated.enabled, "assistant toggled");
        self.snapshot()
    }
}
