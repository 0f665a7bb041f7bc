//! Telegram Bot API delivery transport. Chat id doubles as the user id.

use std::time::Duration;

use anyhow::{Context, Result};
use quadrant_core::UserId;
use quadrant_sched::{DeliveryError, NotificationSink};
use serde_json::json;
use tracing::debug;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramSink {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramSink {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            api_base: TELEGRAM_API_BASE.to_string(),
            token: token.into(),
        })
    }
}

impl NotificationSink for TelegramSink {
    async fn send(&self, user: UserId, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "chat_id": user, "text": text }))
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected(format!("{status}: {body}")));
        }

        debug!(user, "notification delivered");
        Ok(())
    }
}
