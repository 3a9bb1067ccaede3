use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{RewriteError, Settings};

use super::config::default_settings_path;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsStoreError {
    #[error("failed to read settings from {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to write settings to {path}: {message}")]
    Write { path: String, message: String },
    #[error("failed to encode settings: {message}")]
    Encode { message: String },
    #[error("settings lock poisoned")]
    LockPoisoned,
}

impl From<SettingsStoreError> for RewriteError {
    fn from(error: SettingsStoreError) -> Self {
        RewriteError::config(format!("Could not access extension settings: {error}"))
    }
}

/// Persisted settings record. Every reader goes back to the store, so writes
/// are visible on the next request.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings, SettingsStoreError>;

    fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError>;

    fn update(&self, apply: &dyn Fn(&mut Settings)) -> Result<Settings, SettingsStoreError> {
        let mut settings = self.load()?;
        apply(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self, RewriteError> {
        Ok(Self::new(default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Settings, SettingsStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file missing, using defaults");
                return Ok(Settings::default());
            }
            Err(error) => {
                return Err(SettingsStoreError::Read {
                    path: self.display_path(),
                    message: error.to_string(),
                });
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => Ok(settings),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    "settings file is invalid, using defaults: {error}"
                );
                let backup_path = self.path.with_extension("json.corrupt");
                if let Err(error) = fs::rename(&self.path, &backup_path) {
                    warn!(
                        path = %backup_path.display(),
                        "failed to back up invalid settings file: {error}"
                    );
                }
                Ok(Settings::default())
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| SettingsStoreError::Write {
                path: self.display_path(),
                message: error.to_string(),
            })?;
        }

        let content =
            serde_json::to_string_pretty(settings).map_err(|error| SettingsStoreError::Encode {
                message: error.to_string(),
            })?;
        fs::write(&self.path, content).map_err(|error| SettingsStoreError::Write {
            path: self.display_path(),
            message: error.to_string(),
        })?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsStoreError> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|_| SettingsStoreError::LockPoisoned)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError> {
        let mut stored = self
            .settings
            .lock()
            .map_err(|_| SettingsStoreError::LockPoisoned)?;
        *stored = settings.clone();
        Ok(())
    }
}
