use std::fmt;

use async_trait::async_trait;
use nw_core::format::{utf16_len, MAX_MESSAGE_LEN};
use nw_core::{Error, Publisher, Result, TelegramConfig};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Markup convention shared with the message formatter.
pub const PARSE_MODE: &str = "HTML";

const UNREACHABLE: &str = "telegram is unreachable";
const TIMED_OUT: &str = "telegram did not answer in time";

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts messages to one channel through the Bot API `sendMessage` method.
///
/// Delivery is at most once per call: a failed request is reported, never resent.
pub struct TelegramPublisher {
    client: Client,
    api_base: String,
    bot_token: String,
    channel_id: String,
}

impl fmt::Debug for TelegramPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramPublisher")
            .field("client", &"<reqwest::Client>")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

impl TelegramPublisher {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: config.api_base.as_str().trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            channel_id: config.channel_id.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn publish(&self, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            return Err(Error::InvalidInput("message is empty".to_string()));
        }
        if utf16_len(message) > MAX_MESSAGE_LEN {
            return Err(Error::InvalidInput(format!(
                "message exceeds {} characters",
                MAX_MESSAGE_LEN
            )));
        }

        let request = SendMessageRequest {
            chat_id: &self.channel_id,
            text: message,
            parse_mode: PARSE_MODE,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // the request URL carries the bot token
                let e = e.without_url();
                warn!("📡 Telegram transport error: {}", e);
                let reason = if e.is_timeout() { TIMED_OUT } else { UNREACHABLE };
                Error::Publish(reason.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("📡 Telegram body could not be read: {}", e.without_url());
            Error::Publish(UNREACHABLE.to_string())
        })?;

        match serde_json::from_str::<BotApiResponse>(&body) {
            Ok(reply) if reply.ok && status.is_success() => {
                info!("📬 Delivered to {}", self.channel_id);
                Ok(())
            }
            Ok(reply) => Err(Error::Publish(
                reply.description.unwrap_or_else(|| status_reason(status)),
            )),
            Err(e) => {
                warn!("📡 Unreadable Telegram reply (HTTP {}): {}", status, e);
                Err(Error::Publish(status_reason(status)))
            }
        }
    }
}

fn status_reason(status: StatusCode) -> String {
    if status.is_success() {
        "telegram sent an unexpected reply".to_string()
    } else {
        format!("telegram answered HTTP {}", status.as_u16())
    }
}
