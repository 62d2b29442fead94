//! Runtime settings for mailbox tools
//!
//! Settings come from (in order of priority):
//! 1. The `MISTBOX_API_BASE` environment variable (base URL only)
//! 2. ~/.config/mistbox/settings.json
//! 3. Built-in defaults
//!
//! Every field is optional in the file; absent fields keep their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::provider::MailTmClient;

/// Settings filename in the Mistbox config directory
const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding the provider base URL
const API_BASE_ENV: &str = "MISTBOX_API_BASE";

fn default_api_base() -> String {
    MailTmClient::DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_mailbox_ttl() -> u64 {
    600
}

fn default_local_part_prefix() -> String {
    "mist_".to_string()
}

/// User-tunable settings shared by the CLI and the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Provider API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Seconds between periodic inbox polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Initial countdown value for a fresh mailbox, in seconds
    #[serde(default = "default_mailbox_ttl")]
    pub mailbox_ttl_secs: u64,
    /// Prefix for generated local parts
    #[serde(default = "default_local_part_prefix")]
    pub local_part_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            poll_interval_secs: default_poll_interval(),
            mailbox_ttl_secs: default_mailbox_ttl(),
            local_part_prefix: default_local_part_prefix(),
        }
    }
}

impl Settings {
    /// Load settings from the config file, falling back to defaults, then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let settings = if config::config_exists(SETTINGS_FILE) {
            config::load_json(SETTINGS_FILE)?
        } else {
            Self::default()
        };
        let settings = settings.with_api_base_override(std::env::var(API_BASE_ENV).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Persist the settings to the config file
    pub fn save(&self) -> Result<()> {
        config::save_json(SETTINGS_FILE, self)
    }

    /// Check that the settings are usable before any request goes out
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_base)
            .with_context(|| format!("Invalid provider base URL: {}", self.api_base))?;
        if self.poll_interval_secs == 0 {
            anyhow::bail!("Poll interval must be at least one second");
        }
        Ok(())
    }

    fn with_api_base_override(mut self, api_base: Option<String>) -> Self {
        if let Some(api_base) = api_base.filter(|s| !s.is_empty()) {
            self.api_base = api_base;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base, "https://api.mail.tm");
        assert_eq!(settings.poll_interval_secs, 5);
        assert_eq!(settings.mailbox_ttl_secs, 600);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"poll_interval_secs": 10}"#).unwrap();
        assert_eq!(settings.poll_interval_secs, 10);
        assert_eq!(settings.api_base, "https://api.mail.tm");
        assert_eq!(settings.mailbox_ttl_secs, 600);
    }

    #[test]
    fn test_env_override_wins() {
        let settings = Settings::default()
            .with_api_base_override(Some("http://localhost:8080".to_string()));
        assert_eq!(settings.api_base, "http://localhost:8080");
    }

    #[test]
    fn test_empty_override_ignored() {
        let settings = Settings::default().with_api_base_override(Some(String::new()));
        assert_eq!(settings.api_base, "https://api.mail.tm");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let settings = Settings {
            api_base: "not a url".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let settings = Settings {
            poll_interval_secs: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
