//! Telegram channel: webhook update types and sendMessage via Bot API.

use crate::channels::outbound::ChatSender;
use async_trait::async_trait;
use serde::Deserialize;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram update payload (webhook POST body).
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    #[serde(default)]
    pub username: Option<String>,
}

/// Telegram channel connector: sends replies via sendMessage and manages the
/// bot webhook registration.
pub struct TelegramChannel {
    api_base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(token: Option<String>) -> Self {
        Self {
            api_base: TELEGRAM_API_BASE.to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// As [`new`](Self::new) with a custom API base URL (for tests).
    pub fn with_api_base(token: Option<String>, api_base: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn token(&self) -> Result<&str, String> {
        self.token
            .as_deref()
            .ok_or_else(|| "telegram bot token not configured".to_string())
    }

    /// Register a webhook URL so Telegram POSTs updates to it.
    pub async fn set_webhook(&self, url: &str) -> Result<(), String> {
        let api_url = format!("{}/bot{}/setWebhook", self.api_base, self.token()?);
        let body = serde_json::json!({ "url": url });
        let res = self
            .client
            .post(&api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("setWebhook failed: {} {}", status, body));
        }
        Ok(())
    }

    /// Remove the webhook registration.
    pub async fn delete_webhook(&self) -> Result<(), String> {
        let url = format!("{}/bot{}/deleteWebhook", self.api_base, self.token()?);
        let res = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("deleteWebhook failed: {} {}", status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatSender for TelegramChannel {
    /// Send one message via the sendMessage API. HTML parse mode can be
    /// rejected server-side when the content is malformed; the caller logs
    /// such failures and moves on.
    async fn send_chunk(&self, chat_id: i64, text: &str, html: bool) -> Result<(), String> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token()?);
        let mut body = serde_json::json!({ "chat_id": chat_id, "text": text });
        if html {
            body["parse_mode"] = serde_json::Value::String("HTML".to_string());
        }
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("sendMessage failed: {} {}", status, body));
        }
        Ok(())
    }
}
