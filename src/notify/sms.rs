//! Twilio SMS dispatcher.

use async_trait::async_trait;

use crate::config::NotifyConfig;
use crate::error::{EngineError, Result};
use crate::notify::Dispatcher;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Sends the batch summary as a text message through the Twilio REST API.
#[derive(Clone)]
pub struct SmsDispatcher {
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
    client: reqwest::Client,
}

impl SmsDispatcher {
    /// Build a dispatcher from configuration. Callers should check
    /// [`NotifyConfig::is_configured`] first; an unconfigured dispatcher
    /// fails every send.
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Dispatcher for SmsDispatcher {
    async fn send(&self, recipient: &str, body: &str) -> Result<()> {
        if self.account_sid.trim().is_empty() || self.auth_token.trim().is_empty() {
            return Err(EngineError::Dispatch("sms credentials are empty".to_owned()));
        }

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let params = [
            ("To", recipient),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| EngineError::Dispatch(format!("send to {recipient} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Dispatch(format!(
                "send to {recipient} rejected ({status}): {text}"
            )));
        }

        Ok(())
    }
}
