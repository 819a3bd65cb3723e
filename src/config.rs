use std::path::PathBuf;

use crate::endpoint::{ApiVersion, Endpoint, DEFAULT_BASE_URL};
use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ICON: &str = "robot_icon.jpg";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub endpoint: Endpoint,
    pub icon_path: PathBuf,
}

impl Config {
    /// Reads settings from the process environment. Call after `.env` has been loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("GOOGLE_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let version = match get("GEMINI_API_VERSION") {
            Some(v) => v.parse::<ApiVersion>()?,
            None => ApiVersion::default(),
        };
        let base_url = get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            model: get("MEDMED_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: Endpoint::new(&base_url, version),
            icon_path: get("MEDMED_ICON")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ICON)),
        })
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("icon_path", &self.icon_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, Endpoint::default());
        assert_eq!(config.icon_path, PathBuf::from(DEFAULT_ICON));
    }

    #[test]
    fn falls_back_to_google_api_key() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "  "),
            ("GOOGLE_API_KEY", "other"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "other");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("MEDMED_MODEL", "gemini-2.5-pro")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("MEDMED_MODEL", "gemini-2.5-pro"),
            ("GEMINI_API_BASE", "http://127.0.0.1:9000/"),
            ("GEMINI_API_VERSION", "v1"),
            ("MEDMED_ICON", "assets/bot.png"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(
            config.endpoint.generate_url(&config.model),
            "http://127.0.0.1:9000/v1/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(config.icon_path, PathBuf::from("assets/bot.png"));
    }

    #[test]
    fn debug_output_hides_key() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "top-secret")])).unwrap();
        assert!(!format!("{config:?}").contains("top-secret"));
    }
}
