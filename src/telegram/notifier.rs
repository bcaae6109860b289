//! Outbound replies through the Bot API `sendMessage` method.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::core::config::{self, Config};
use crate::core::error::{AppError, AppResult};
use crate::core::metrics;

/// Delivers a text reply to a chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text` to `chat_id`. Returns whether the Bot API accepted it.
    async fn send(&self, chat_id: i64, text: &str) -> bool;
}

#[derive(Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    ok: bool,
    description: Option<String>,
}

/// Form-encoded `sendMessage` client. One attempt per call, no retries.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    token: SecretString,
    parse_mode: Option<String>,
}

impl TelegramNotifier {
    pub fn new(api_url: impl Into<String>, token: SecretString) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config::network::message_timeout())
            .build()?;
        Ok(Self::with_client(client, api_url, token))
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            parse_mode: None,
        }
    }

    /// Builds a notifier from the configured Bot API URL and token.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let token = config.require_bot_token()?.clone();
        Self::new(config.bot_api_url.clone(), token)
    }

    /// Adds `parse_mode` (e.g. `HTML`) to every message.
    pub fn with_parse_mode(mut self, parse_mode: impl Into<String>) -> Self {
        self.parse_mode = Some(parse_mode.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.token.expose_secret())
    }

    /// Like [`Notifier::send`] but with the failure cause.
    pub async fn try_send(&self, chat_id: i64, text: &str) -> AppResult<()> {
        let chat_id = chat_id.to_string();
        let mut form: Vec<(&str, &str)> = vec![("chat_id", chat_id.as_str()), ("text", text)];
        if let Some(parse_mode) = &self.parse_mode {
            form.push(("parse_mode", parse_mode.as_str()));
        }

        // reqwest errors carry the URL, which contains the token
        let response = self
            .client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::DeliveryFailure(e.without_url().to_string()))?;

        let status = response.status();
        let body: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| AppError::DeliveryFailure(format!("HTTP {}: {}", status, e.without_url())))?;

        if body.ok {
            Ok(())
        } else {
            Err(AppError::DeliveryFailure(format!(
                "HTTP {}: {}",
                status,
                body.description.unwrap_or_else(|| "ok=false".to_string())
            )))
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> bool {
        match self.try_send(chat_id, text).await {
            Ok(()) => {
                metrics::record_message_sent(true);
                true
            }
            Err(e) => {
                log::warn!("Failed to send message to chat {}: {}", chat_id, e);
                metrics::record_message_sent(false);
                false
            }
        }
    }
}
