//! Telegram Bot API transport — one `sendMessage` call through one bot.
//!
//! Every attempt, including reading the response body, is bounded by the
//! request timeout. While the host is unreachable the attempt keeps re-trying
//! the connection until that timeout elapses instead of failing on the first
//! refused connect.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;

use tglogger_common::{NotifierError, ParseMode, Result};

/// JSON body of `POST /bot<token>/sendMessage`.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    message_thread_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

/// HTTP side of the notifier. Cheap to clone; the underlying client pools
/// connections across attempts.
#[derive(Debug, Clone)]
pub struct BotTransport {
    client: Client,
    api_base: String,
    request_timeout: Duration,
    wait_for_connectivity: bool,
    connectivity_retry_interval: Duration,
    parse_mode: Option<ParseMode>,
}

impl BotTransport {
    pub fn new(
        api_base: impl Into<String>,
        request_timeout: Duration,
        wait_for_connectivity: bool,
        connectivity_retry_interval: Duration,
        parse_mode: Option<ParseMode>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            request_timeout,
            wait_for_connectivity,
            connectivity_retry_interval,
            parse_mode,
        }
    }

    pub fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }

    /// Deliver `text` through a single bot and report whether it went out.
    ///
    /// Failures are logged here and never returned; the caller only decides
    /// whether to move on to the next bot.
    pub async fn attempt_send(
        &self,
        text: &str,
        chat_id: i64,
        thread_id: i64,
        bot_token: &str,
    ) -> bool {
        let bot = bot_id(bot_token);

        match self.try_send(text, chat_id, thread_id, bot_token).await {
            Ok(()) => {
                tracing::debug!(bot, chat_id, thread_id, "Message delivered");
                true
            }
            Err(NotifierError::RateLimited { retry_after }) => {
                tracing::warn!(bot, ?retry_after, "Too many requests for bot");
                false
            }
            Err(NotifierError::Status { status, body }) => {
                tracing::warn!(bot, status, body = %body, "Bot API returned an error");
                false
            }
            Err(e) if e.is_network() => {
                tracing::warn!(bot, error = %e, "Network error while sending message");
                false
            }
            Err(e) => {
                tracing::error!(bot, error = %e, "Failed to build sendMessage request");
                false
            }
        }
    }

    /// Typed form of [`attempt_send`](Self::attempt_send).
    pub async fn try_send(
        &self,
        text: &str,
        chat_id: i64,
        thread_id: i64,
        bot_token: &str,
    ) -> Result<()> {
        let payload = SendMessagePayload {
            chat_id,
            message_thread_id: thread_id,
            text,
            parse_mode: self.parse_mode,
        };
        let url = self.send_message_url(bot_token);

        // The bound covers the whole exchange, body included.
        tokio::time::timeout(self.request_timeout, async {
            let response = self.post(&url, &payload).await?;
            Self::check_response(response).await
        })
        .await
        .map_err(|_| NotifierError::Timeout(self.request_timeout))?
    }

    async fn post(&self, url: &str, payload: &SendMessagePayload<'_>) -> Result<Response> {
        loop {
            let result = self.client.post(url).json(payload).send().await;

            match result {
                Err(e) if e.is_connect() && self.wait_for_connectivity => {
                    tracing::debug!(
                        error = %e,
                        retry_in_ms = self.connectivity_retry_interval.as_millis() as u64,
                        "Bot API unreachable, waiting for connectivity"
                    );
                    tokio::time::sleep(self.connectivity_retry_interval).await;
                }
                other => return other.map_err(NotifierError::from),
            }
        }
    }

    async fn check_response(response: Response) -> Result<()> {
        let status = response.status();

        match status {
            StatusCode::OK => Ok(()),
            StatusCode::TOO_MANY_REQUESTS => {
                let body: serde_json::Value = response.json().await.unwrap_or_default();
                let retry_after = body
                    .get("parameters")
                    .and_then(|p| p.get("retry_after"))
                    .and_then(|v| v.as_u64());
                Err(NotifierError::RateLimited { retry_after })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(NotifierError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// Public half of a bot token (`<bot id>:<secret>`), safe to log.
pub fn bot_id(bot_token: &str) -> &str {
    bot_token
        .split_once(':')
        .map(|(id, _)| id)
        .unwrap_or("unknown")
}
