//! Notification dispatcher — fire-and-forget delivery with bot failover.
//!
//! For every message:
//! 1. Truncate the text to the message limit (by characters, not bytes)
//! 2. Shuffle the bot pool so load is spread across bots
//! 3. Try each bot in turn, stopping at the first one that delivers
//! 4. Log a total failure when every bot has been exhausted
//!
//! The destination and settings are immutable after construction and shared
//! through an `Arc`, so concurrent dispatches need no locking.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use uuid::Uuid;

use tglogger_common::config::{DEFAULT_API_BASE, NotifierConfig};
use tglogger_common::{Destination, NotificationKind, ParseMode};

use crate::transport::BotTransport;

/// Maximum message length in characters. Telegram allows 4096; the rest is
/// headroom for entities added by the HTML parser.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Default per-attempt timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between connection attempts while the API is unreachable.
const DEFAULT_CONNECTIVITY_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Delivery tuning shared by every dispatch of one dispatcher.
#[derive(Debug, Clone)]
pub struct DeliverySettings {
    pub api_base: String,
    pub request_timeout: Duration,
    /// Keep retrying the connection (within `request_timeout`) while offline.
    pub wait_for_connectivity: bool,
    pub connectivity_retry_interval: Duration,
    pub parse_mode: Option<ParseMode>,
    /// Randomise bot order per dispatch. When off, bots are tried in the
    /// order they were configured.
    pub shuffle_bots: bool,
    pub max_length: usize,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            wait_for_connectivity: true,
            connectivity_retry_interval: DEFAULT_CONNECTIVITY_RETRY_INTERVAL,
            parse_mode: Some(ParseMode::Html),
            shuffle_bots: true,
            max_length: MAX_MESSAGE_LENGTH,
        }
    }
}

impl DeliverySettings {
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            parse_mode: config.parse_mode,
            ..Self::default()
        }
    }
}

/// Result of one pass over the bot pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A bot accepted the message after `attempts` tries.
    Delivered { attempts: usize },
    /// Every bot failed (zero attempts when no bots are configured).
    Exhausted { attempts: usize },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            DispatchOutcome::Delivered { attempts } | DispatchOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }
}

struct Inner {
    destination: Destination,
    transport: BotTransport,
    shuffle_bots: bool,
    max_length: usize,
}

/// Sends notifications into the topics of one chat through a pool of bots.
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<Inner>,
}

impl NotificationDispatcher {
    pub fn new(destination: Destination) -> Self {
        Self::with_settings(destination, DeliverySettings::default())
    }

    pub fn with_settings(destination: Destination, settings: DeliverySettings) -> Self {
        let transport = BotTransport::new(
            settings.api_base,
            settings.request_timeout,
            settings.wait_for_connectivity,
            settings.connectivity_retry_interval,
            settings.parse_mode,
        );

        Self {
            inner: Arc::new(Inner {
                destination,
                transport,
                shuffle_bots: settings.shuffle_bots,
                max_length: settings.max_length,
            }),
        }
    }

    pub fn from_config(config: &NotifierConfig) -> Self {
        Self::with_settings(config.destination(), DeliverySettings::from_config(config))
    }

    pub fn destination(&self) -> &Destination {
        &self.inner.destination
    }

    /// Queue a notification in the background and return immediately.
    ///
    /// The outcome is only observable through logs. Must be called from
    /// within a Tokio runtime; otherwise the message is dropped and an error
    /// is logged.
    pub fn send<K>(&self, text: impl Into<String>, kind: &K)
    where
        K: NotificationKind + ?Sized,
    {
        let label = kind.raw_value().to_string();
        let thread_id = kind.thread_id();
        let text = text.into();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(
                    kind = %label,
                    error = %e,
                    "No async runtime, notification dropped"
                );
                return;
            }
        };

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            inner.run(&text, &label, thread_id).await;
        });
    }

    /// Run the failover loop to completion and report how it ended.
    pub async fn dispatch<K>(&self, text: &str, kind: &K) -> DispatchOutcome
    where
        K: NotificationKind + ?Sized,
    {
        self.inner
            .run(text, kind.raw_value(), kind.thread_id())
            .await
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new(Destination::default())
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("chat_id", &self.inner.destination.chat_id)
            .field("bots", &self.inner.destination.bot_tokens.len())
            .finish()
    }
}

impl Inner {
    async fn run(&self, text: &str, kind: &str, thread_id: i64) -> DispatchOutcome {
        let dispatch_id = Uuid::new_v4();
        let message = truncate_message(text, self.max_length);
        let chat_id = self.destination.chat_id;
        let mut attempts = 0;

        for token in self.bot_order() {
            attempts += 1;
            if self
                .transport
                .attempt_send(message, chat_id, thread_id, token)
                .await
            {
                tracing::debug!(%dispatch_id, kind, thread_id, attempts, "Notification delivered");
                return DispatchOutcome::Delivered { attempts };
            }
        }

        tracing::error!(
            %dispatch_id,
            kind,
            thread_id,
            attempts,
            "All bots failed for notification"
        );
        DispatchOutcome::Exhausted { attempts }
    }

    fn bot_order(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self
            .destination
            .bot_tokens
            .iter()
            .map(String::as_str)
            .collect();

        if self.shuffle_bots {
            tokens.shuffle(&mut rand::rng());
        }
        tokens
    }
}

/// Cut `text` to at most `max_chars` Unicode scalar values.
pub fn truncate_message(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
