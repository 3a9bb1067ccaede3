use std::path::PathBuf;
use std::time::Duration;

use crate::domain::RewriteError;

pub const ENV_SETTINGS_PATH: &str = "WORDSMITH_SETTINGS_PATH";
pub const ENV_OPENAI_BASE_URL: &str = "WORDSMITH_OPENAI_BASE_URL";
pub const ENV_ANTHROPIC_BASE_URL: &str = "WORDSMITH_ANTHROPIC_BASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "WORDSMITH_HTTP_TIMEOUT_SECS";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

const SETTINGS_DIR_NAME: &str = "wordsmith";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Where the vendor clients send requests. A `None` timeout leaves the
/// transport's own default in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ProviderEndpoints {
    pub fn with_base_urls(
        openai_base_url: impl Into<String>,
        anthropic_base_url: impl Into<String>,
    ) -> Self {
        Self {
            openai_base_url: openai_base_url.into(),
            anthropic_base_url: anthropic_base_url.into(),
            timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, RewriteError> {
        Self::from_lookup(read_env_var)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, RewriteError>
    where
        F: Fn(&str) -> Result<Option<String>, RewriteError>,
    {
        let defaults = Self::default();
        let openai_base_url =
            non_blank(lookup(ENV_OPENAI_BASE_URL)?).unwrap_or(defaults.openai_base_url);
        let anthropic_base_url =
            non_blank(lookup(ENV_ANTHROPIC_BASE_URL)?).unwrap_or(defaults.anthropic_base_url);
        let timeout = match lookup(ENV_HTTP_TIMEOUT_SECS)? {
            Some(value) => Some(parse_timeout_seconds(ENV_HTTP_TIMEOUT_SECS, &value)?),
            None => None,
        };

        Ok(Self {
            openai_base_url,
            anthropic_base_url,
            timeout,
        })
    }
}

pub fn default_settings_path() -> Result<PathBuf, RewriteError> {
    resolve_settings_path(read_env_var(ENV_SETTINGS_PATH)?, dirs::config_dir())
}

fn resolve_settings_path(
    override_path: Option<String>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, RewriteError> {
    if let Some(path) = non_blank(override_path) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = config_dir.ok_or_else(|| {
        RewriteError::config(format!(
            "could not determine a configuration directory (set {ENV_SETTINGS_PATH})"
        ))
    })?;
    Ok(config_dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
}

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, RewriteError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(RewriteError::config(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, RewriteError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        RewriteError::config(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(RewriteError::config(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{
        DEFAULT_ANTHROPIC_BASE_URL, DEFAULT_OPENAI_BASE_URL, ENV_ANTHROPIC_BASE_URL,
        ENV_HTTP_TIMEOUT_SECS, ProviderEndpoints, parse_timeout_seconds, resolve_settings_path,
    };
    use crate::domain::RewriteError;

    fn lookup_from(
        values: &[(&str, &str)],
    ) -> impl Fn(&str) -> Result<Option<String>, RewriteError> {
        let values = values
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| Ok(values.get(name).cloned())
    }

    #[test]
    fn parse_timeout_seconds_accepts_positive_integer_values() {
        let timeout = parse_timeout_seconds("TEST_TIMEOUT", "8")
            .expect("positive integer timeout should parse");
        assert_eq!(timeout, Duration::from_secs(8));
    }

    #[test]
    fn parse_timeout_seconds_rejects_invalid_values() {
        let zero = parse_timeout_seconds("TEST_TIMEOUT", "0")
            .expect_err("zero timeout should fail validation");
        assert!(matches!(
            zero,
            RewriteError::Config { message }
            if message == "TEST_TIMEOUT must be greater than 0 seconds"
        ));

        let invalid = parse_timeout_seconds("TEST_TIMEOUT", "abc")
            .expect_err("non-integer timeout should fail validation");
        assert!(matches!(
            invalid,
            RewriteError::Config { message }
            if message == "TEST_TIMEOUT must be a positive integer in seconds"
        ));
    }

    #[test]
    fn from_lookup_uses_defaults_when_nothing_is_set() {
        let endpoints =
            ProviderEndpoints::from_lookup(lookup_from(&[])).expect("defaults should resolve");

        assert_eq!(endpoints.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(endpoints.anthropic_base_url, DEFAULT_ANTHROPIC_BASE_URL);
        assert_eq!(endpoints.timeout, None);
    }

    #[test]
    fn from_lookup_applies_overrides() {
        let endpoints = ProviderEndpoints::from_lookup(lookup_from(&[
            (ENV_ANTHROPIC_BASE_URL, " http://127.0.0.1:9000 "),
            (ENV_HTTP_TIMEOUT_SECS, "12"),
        ]))
        .expect("overrides should resolve");

        assert_eq!(endpoints.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(endpoints.anthropic_base_url, "http://127.0.0.1:9000");
        assert_eq!(endpoints.timeout, Some(Duration::from_secs(12)));
    }

    #[test]
    fn resolve_settings_path_prefers_override() {
        let path = resolve_settings_path(
            Some("/tmp/custom.json".to_string()),
            Some(PathBuf::from("/home/user/.config")),
        )
        .expect("override should resolve");

        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn resolve_settings_path_uses_config_dir() {
        let path = resolve_settings_path(None, Some(PathBuf::from("/home/user/.config")))
            .expect("config dir should resolve");

        assert_eq!(
            path,
            PathBuf::from("/home/user/.config/wordsmith/settings.json")
        );
    }

    #[test]
    fn resolve_settings_path_fails_without_any_location() {
        let error = resolve_settings_path(None, None).expect_err("no location should fail");
        assert!(matches!(error, RewriteError::Config { .. }));
    }
}
