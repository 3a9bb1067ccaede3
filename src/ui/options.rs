use std::sync::Arc;

use tracing::{info, warn};

use crate::app::ConnectionTester;
use crate::domain::{ModelOption, ProviderKind, Settings};
use crate::infra::settings_store::{SettingsStore, SettingsStoreError};

pub const MISSING_KEY_ON_SAVE: &str = "Please enter an API key";
pub const MISSING_KEY_ON_TEST: &str = "Please enter an API key first";
pub const SAVED_MESSAGE: &str = "Settings saved successfully!";
pub const TESTING_MESSAGE: &str = "Testing API connection...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FormMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn testing() -> Self {
        Self {
            kind: MessageKind::Info,
            text: TESTING_MESSAGE.to_string(),
        }
    }
}

/// The values currently entered in the options form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsDraft {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
}

impl OptionsDraft {
    pub fn from_settings(settings: &Settings) -> Self {
        let provider = settings.provider_kind().unwrap_or(ProviderKind::Anthropic);
        Self {
            provider,
            api_key: settings.api_key.clone(),
            model: settings.model_or_default(provider).to_string(),
        }
    }

    pub fn model_options(&self) -> &'static [ModelOption] {
        self.provider.model_catalog()
    }

    /// Switching vendor resets the model to the first entry of its catalog.
    pub fn select_provider(&mut self, provider: ProviderKind) {
        if self.provider == provider {
            return;
        }
        self.provider = provider;
        self.model = provider
            .model_catalog()
            .first()
            .map_or(provider.default_model(), |option| option.id)
            .to_string();
    }

    fn validated(&self, missing_key_message: &str) -> Result<Settings, FormMessage> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(FormMessage::error(missing_key_message));
        }
        self.provider
            .validate_api_key_format(api_key)
            .map_err(|error| FormMessage::error(error.to_string()))?;

        Ok(Settings {
            api_key: api_key.to_string(),
            provider: self.provider.as_str().to_string(),
            model: self.model.clone(),
            ..Settings::default()
        })
    }
}

pub struct OptionsForm {
    settings: Arc<dyn SettingsStore>,
    tester: ConnectionTester,
}

impl OptionsForm {
    pub fn new(settings: Arc<dyn SettingsStore>, tester: ConnectionTester) -> Self {
        Self { settings, tester }
    }

    pub fn load(&self) -> Result<OptionsDraft, SettingsStoreError> {
        Ok(OptionsDraft::from_settings(&self.settings.load()?))
    }

    /// Writes provider, key and model. The enabled flag is left as stored.
    pub fn save(&self, draft: &OptionsDraft) -> FormMessage {
        let validated = match draft.validated(MISSING_KEY_ON_SAVE) {
            Ok(validated) => validated,
            Err(message) => return message,
        };

        let result = self.settings.update(&|settings| {
            settings.api_key = validated.api_key.clone();
            settings.provider = validated.provider.clone();
            settings.model = validated.model.clone();
        });
        match result {
            Ok(_) => {
                info!(provider = %validated.provider, model = %validated.model, "settings saved");
                FormMessage::success(SAVED_MESSAGE)
            }
            Err(error) => {
                warn!("failed to save settings: {error}");
                FormMessage::error(format!("Error saving settings: {error}"))
            }
        }
    }

    /// Tests the entered values without saving them.
    pub fn test_connection(&self, draft: &OptionsDraft) -> FormMessage {
        let settings = match draft.validated(MISSING_KEY_ON_TEST) {
            Ok(settings) => settings,
            Err(message) => return message,
        };

        let outcome = self.tester.run(&settings);
        FormMessage {
            kind: if outcome.is_success() {
                MessageKind::Success
            } else {
                MessageKind::Error
            },
            text: outcome.message(),
        }
    }
}
