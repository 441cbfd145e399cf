//! Configuration types for the reset engine.
//!
//! Deployments are environment-driven (store and SMS credentials come
//! from env vars); a TOML file can stand in for the environment when one
//! is passed to the binary. Secret fields are redacted in `Debug` output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Task store (Notion) settings.
    pub store: StoreConfig,
    /// Notification (Twilio SMS) settings.
    pub notify: NotifyConfig,
    /// Log file settings.
    pub log: LogConfig,
}

/// Task store settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Integration token, sent as bearer auth.
    pub api_key: String,
    /// Shared database URL; the database id is its last path segment.
    pub database_url: String,
    /// Name of the status property.
    pub status_property: String,
    /// Name of the next-due date property (plain date or formula).
    pub due_property: String,
    /// Name of the completion-stamp property.
    pub completed_property: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            database_url: String::new(),
            status_property: "Status".to_owned(),
            due_property: "Due Next".to_owned(),
            completed_property: "Last Completed".to_owned(),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_key", &redact(&self.api_key))
            .field("database_url", &self.database_url)
            .field("status_property", &self.status_property)
            .field("due_property", &self.due_property)
            .field("completed_property", &self.completed_property)
            .finish()
    }
}

/// Notification settings. All-empty means "no dispatcher configured":
/// the engine still runs, it just skips the notification step.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// SMS provider account sid.
    pub account_sid: String,
    /// SMS provider auth token.
    pub auth_token: String,
    /// Sender phone number.
    pub from_number: String,
    /// Recipient phone numbers.
    pub recipients: Vec<String>,
}

impl NotifyConfig {
    /// Whether enough is configured to build a dispatcher.
    pub fn is_configured(&self) -> bool {
        !self.account_sid.trim().is_empty()
            && !self.auth_token.trim().is_empty()
            && !self.from_number.trim().is_empty()
    }
}

impl fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &redact(&self.auth_token))
            .field("from_number", &self.from_number)
            .field("recipients", &self.recipients)
            .finish()
    }
}

/// Log file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory the rolling log files are written to.
    pub directory: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
        }
    }
}

fn redact(s: &str) -> &str {
    if s.is_empty() { "" } else { "[REDACTED]" }
}

impl EngineConfig {
    /// Load configuration from the process environment.
    ///
    /// Required: `NOTION_API_KEY`, `NOTION_DATABASE_URL`. Optional:
    /// `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER`,
    /// `PHONE_NUMBERS` (comma-separated), `TASKCYCLE_LOG_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| EngineError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        config.store.api_key = get("NOTION_API_KEY")
            .ok_or_else(|| EngineError::Config("NOTION_API_KEY is not set".to_owned()))?;
        config.store.database_url = get("NOTION_DATABASE_URL")
            .ok_or_else(|| EngineError::Config("NOTION_DATABASE_URL is not set".to_owned()))?;

        config.notify.account_sid = get("TWILIO_ACCOUNT_SID").unwrap_or_default();
        config.notify.auth_token = get("TWILIO_AUTH_TOKEN").unwrap_or_default();
        config.notify.from_number = get("TWILIO_PHONE_NUMBER").unwrap_or_default();
        if let Some(numbers) = get("PHONE_NUMBERS") {
            config.notify.recipients = numbers
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_owned)
                .collect();
        }

        if let Some(dir) = get("TASKCYCLE_LOG_DIR") {
            config.log.directory = PathBuf::from(dir);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| (*v).to_owned())
    }

    #[test]
    fn env_loading_requires_store_credentials() {
        let err = EngineConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("NOTION_API_KEY"));

        let err = EngineConfig::from_lookup(lookup(&[("NOTION_API_KEY", "secret")])).unwrap_err();
        assert!(err.to_string().contains("NOTION_DATABASE_URL"));
    }

    #[test]
    fn env_loading_splits_recipients_and_skips_blanks() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("NOTION_API_KEY", "secret"),
            ("NOTION_DATABASE_URL", "https://example.com/db/abc123"),
            ("TWILIO_ACCOUNT_SID", "AC1"),
            ("TWILIO_AUTH_TOKEN", "tok"),
            ("TWILIO_PHONE_NUMBER", "+15550100"),
            ("PHONE_NUMBERS", "+15550111, +15550122,,"),
        ]))
        .unwrap();

        assert!(config.notify.is_configured());
        assert_eq!(config.notify.recipients, vec!["+15550111", "+15550122"]);
        assert_eq!(config.store.status_property, "Status");
    }

    #[test]
    fn missing_sms_credentials_leave_dispatcher_unconfigured() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("NOTION_API_KEY", "secret"),
            ("NOTION_DATABASE_URL", "https://example.com/db/abc123"),
        ]))
        .unwrap();
        assert!(!config.notify.is_configured());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = EngineConfig::default();
        config.store.api_key = "super-secret".to_owned();
        config.notify.auth_token = "also-secret".to_owned();

        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("also-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskcycle.toml");
        std::fs::write(
            &path,
            r#"
[store]
api_key = "secret"
database_url = "https://example.com/db/abc123"
due_property = "Next Due"

[notify]
account_sid = "AC1"
auth_token = "tok"
from_number = "+15550100"
recipients = ["+15550111"]
"#,
        )
        .unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.store.due_property, "Next Due");
        assert_eq!(config.store.completed_property, "Last Completed");
        assert!(config.notify.is_configured());
    }
}
