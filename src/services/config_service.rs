use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::local_store::LocalStore;
use crate::error::PortalError;
use crate::i18n::Language;

pub const CONFIG_KEY: &str = "config";
pub const DEFAULT_BASE_URL: &str = "http://localhost/ums_feedback_system/";

pub const BASE_URL_ENV: &str = "UMS_BASE_URL";
pub const SESSION_COOKIE_ENV: &str = "UMS_SESSION_COOKIE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root the API paths are resolved against.
    pub base_url: String,
    pub language: Language,
    /// PHP session cookie (`PHPSESSID=...`) sent with every request.
    pub session_cookie: Option<String>,
    pub cooldown_secs: u64,
    pub request_timeout_secs: u64,
    pub feedback_reset_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: Language::En,
            session_cookie: None,
            cooldown_secs: 30,
            request_timeout_secs: 30,
            feedback_reset_delay_ms: 2000,
        }
    }
}

impl Config {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn feedback_reset_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_reset_delay_ms)
    }
}

pub fn load_config(store: &LocalStore) -> Result<Config, PortalError> {
    Ok(store.get(CONFIG_KEY)?.unwrap_or_default())
}

pub fn save_config(store: &LocalStore, config: &Config) -> Result<(), PortalError> {
    store.set(CONFIG_KEY, config)
}

/// Stored config with `UMS_BASE_URL` / `UMS_SESSION_COOKIE` applied on top.
pub fn effective_config(store: &LocalStore) -> Result<Config, PortalError> {
    let config = load_config(store)?;
    Ok(apply_overrides(
        config,
        std::env::var(BASE_URL_ENV).ok(),
        std::env::var(SESSION_COOKIE_ENV).ok(),
    ))
}

fn apply_overrides(mut config: Config, base_url: Option<String>, cookie: Option<String>) -> Config {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        config.base_url = url;
    }
    if let Some(cookie) = cookie.filter(|c| !c.trim().is_empty()) {
        config.session_cookie = Some(cookie);
    }
    config
}

/// Update one field by name and persist the result.
pub fn set_value(store: &LocalStore, key: &str, value: &str) -> Result<Config, PortalError> {
    let mut config = load_config(store).unwrap_or_default();
    let value = value.trim();

    match key {
        "base_url" => {
            url::Url::parse(value)?;
            config.base_url = value.to_string();
        }
        "language" => {
            config.language = value.parse().map_err(PortalError::Config)?;
        }
        "session_cookie" => {
            config.session_cookie = if value.is_empty() { None } else { Some(value.to_string()) };
        }
        "cooldown_secs" => config.cooldown_secs = parse_number(key, value)?,
        "request_timeout_secs" => config.request_timeout_secs = parse_number(key, value)?,
        "feedback_reset_delay_ms" => config.feedback_reset_delay_ms = parse_number(key, value)?,
        other => return Err(PortalError::Config(format!("Unknown config key: {}", other))),
    }

    save_config(store, &config)?;
    Ok(config)
}

fn parse_number(key: &str, value: &str) -> Result<u64, PortalError> {
    value
        .parse()
        .map_err(|_| PortalError::Config(format!("{} expects a whole number, got '{}'", key, value)))
}

/// Key/value pairs for display. The session cookie is masked.
pub fn describe(config: &Config) -> Vec<(&'static str, String)> {
    let cookie = match config.session_cookie.as_deref() {
        Some(c) if c.chars().count() > 8 => format!("{}...", c.chars().take(8).collect::<String>()),
        Some(c) => c.to_string(),
        None => "(not set)".to_string(),
    };

    vec![
        ("base_url", config.base_url.clone()),
        ("language", config.language.to_string()),
        ("session_cookie", cookie),
        ("cooldown_secs", config.cooldown_secs.to_string()),
        ("request_timeout_secs", config.request_timeout_secs.to_string()),
        ("feedback_reset_delay_ms", config.feedback_reset_delay_ms.to_string()),
    ]
}
