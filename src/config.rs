//! Runtime settings.
//!
//! Values come from the environment (optionally seeded from a `.env` file).
//! CLI flags may override a subset afterwards.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_SERIES: &str = "caiso_carbon_intensity";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_PROMPT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `<series>.json` files.
    pub data_dir: PathBuf,
    /// Series the prompt front-end answers questions about.
    pub default_series: String,
    pub host: String,
    pub port: u16,
    pub ollama_url: String,
    pub ollama_model: String,
    pub prompt_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_series: DEFAULT_SERIES.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            prompt_timeout: Duration::from_secs(DEFAULT_PROMPT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be a valid port number, got '{raw}'.")))?,
            None => defaults.port,
        };

        let prompt_timeout = match get("PROMPT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    AppError::Config(format!("PROMPT_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'."))
                })?;
                if secs == 0 {
                    return Err(AppError::Config("PROMPT_TIMEOUT_SECS must be > 0.".into()));
                }
                Duration::from_secs(secs)
            }
            None => defaults.prompt_timeout,
        };

        Ok(Self {
            data_dir: get("CARBON_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            default_series: get("CARBON_DEFAULT_SERIES").unwrap_or(defaults.default_series),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            ollama_url: get("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: get("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            prompt_timeout,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s.data_dir, PathBuf::from("data"));
        assert_eq!(s.default_series, "caiso_carbon_intensity");
        assert_eq!(s.port, 8000);
        assert_eq!(s.prompt_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let s = Settings::from_lookup(lookup(&[
            ("CARBON_DATA_DIR", "/srv/series"),
            ("PORT", "9001"),
            ("OLLAMA_MODEL", "mistral"),
            ("PROMPT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(s.data_dir, PathBuf::from("/srv/series"));
        assert_eq!(s.bind_addr(), "0.0.0.0:9001");
        assert_eq!(s.ollama_model, "mistral");
        assert_eq!(s.prompt_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = Settings::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Settings::from_lookup(lookup(&[("PROMPT_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
