//! Telegram Bot API notifier.
//!
//! Sends one `sendMessage` per subscriber with a bounded timeout and a short
//! retry ladder. Without a token the notifier stays enabled but inert, so
//! local runs and tests never hit the network.

use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;

use super::{AlertEvent, Notifier};
use crate::report::format_alert_message;

#[derive(Clone)]
pub struct TelegramNotifier {
    token: Option<String>,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl TelegramNotifier {
    pub fn new(token: String) -> Self {
        Self {
            token: Some(token),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    /// Reads `TELEGRAM_BOT_TOKEN`; absent token means deliveries no-op.
    pub fn from_env() -> Self {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok();
        if token.is_none() {
            tracing::info!("telegram disabled (no TELEGRAM_BOT_TOKEN)");
        }
        Self {
            token,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    async fn send(&self, token: &str, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
        };

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&url)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("telegram HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("telegram request failed: {e}"));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, subscriber: i64, event: &AlertEvent) -> Result<()> {
        let Some(token) = &self.token else {
            tracing::debug!(subscriber, subject = %event.subject, "telegram no-op send");
            return Ok(());
        };
        let text = format_alert_message(event);
        self.send(token, subscriber, &text).await
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}
