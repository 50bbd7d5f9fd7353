use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::NotifierError;

/// Environment flag that forces [`RunMode::Debug`] in release builds
/// (e.g. staging or sandbox deployments).
pub const SANDBOX_ENV: &str = "TG_LOGGER_SANDBOX";

/// Topic every built-in kind is redirected to in [`RunMode::Debug`].
pub const DEBUG_THREAD_ID: i64 = 52;

static RUN_MODE: OnceLock<RunMode> = OnceLock::new();

/// Execution mode that decides where built-in notification kinds are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Production,
    Debug,
}

impl RunMode {
    /// Mode of the running process, detected once and cached.
    pub fn current() -> Self {
        *RUN_MODE.get_or_init(Self::detect)
    }

    /// Debug builds and sandboxed deployments both report `Debug`.
    pub fn detect() -> Self {
        let sandbox = std::env::var(SANDBOX_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        if cfg!(debug_assertions) || sandbox {
            RunMode::Debug
        } else {
            RunMode::Production
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Production => write!(f, "production"),
            RunMode::Debug => write!(f, "debug"),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// A logical category of notification.
///
/// `raw_value` labels the kind in logs; `thread_id` is the forum topic
/// (`message_thread_id`) inside the destination chat.
pub trait NotificationKind: Send + Sync {
    fn raw_value(&self) -> &str;

    fn thread_id(&self) -> i64;
}

impl<K: NotificationKind + ?Sized> NotificationKind for &K {
    fn raw_value(&self) -> &str {
        (**self).raw_value()
    }

    fn thread_id(&self) -> i64 {
        (**self).thread_id()
    }
}

/// Built-in notification kinds with a fixed topic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    Subscriptions,
    Errors,
    Analytics,
    Support,
    PaywallOpened,
    Promotion,
    Debug,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::Subscriptions,
        NotificationType::Errors,
        NotificationType::Analytics,
        NotificationType::Support,
        NotificationType::PaywallOpened,
        NotificationType::Promotion,
        NotificationType::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Subscriptions => "subscriptions",
            NotificationType::Errors => "errors",
            NotificationType::Analytics => "analytics",
            NotificationType::Support => "support",
            NotificationType::PaywallOpened => "paywallOpened",
            NotificationType::Promotion => "promotion",
            NotificationType::Debug => "debug",
        }
    }

    /// Resolve the topic for this kind under an explicit run mode.
    ///
    /// In `Debug` every built-in kind lands in [`DEBUG_THREAD_ID`] so that
    /// development traffic never reaches production topics. Custom kinds are
    /// not subject to this redirect.
    pub fn thread_id_in(&self, mode: RunMode) -> i64 {
        if mode == RunMode::Debug {
            return DEBUG_THREAD_ID;
        }

        match self {
            NotificationType::Subscriptions => 2,
            NotificationType::Errors => 3,
            NotificationType::Analytics => 35,
            NotificationType::Support => 145,
            NotificationType::PaywallOpened => 3028,
            NotificationType::Promotion => 3901,
            NotificationType::Debug => DEBUG_THREAD_ID,
        }
    }
}

impl NotificationKind for NotificationType {
    fn raw_value(&self) -> &str {
        self.as_str()
    }

    fn thread_id(&self) -> i64 {
        self.thread_id_in(RunMode::current())
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = NotifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| NotifierError::Config(format!("unknown notification kind: {s}")))
    }
}

/// Caller-defined kind with an explicit label and topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomNotificationType {
    pub raw_value: String,
    pub thread_id: i64,
}

impl CustomNotificationType {
    pub fn new(raw_value: impl Into<String>, thread_id: i64) -> Self {
        Self {
            raw_value: raw_value.into(),
            thread_id,
        }
    }
}

impl NotificationKind for CustomNotificationType {
    fn raw_value(&self) -> &str {
        &self.raw_value
    }

    fn thread_id(&self) -> i64 {
        self.thread_id
    }
}

/// Target chat plus the pool of bots allowed to post into it.
///
/// The default destination targets chat 0 with no bots, which disables
/// delivery entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub chat_id: i64,
    pub bot_tokens: Vec<String>,
}

impl Destination {
    pub fn new(chat_id: i64, bot_tokens: Vec<String>) -> Self {
        Self {
            chat_id,
            bot_tokens,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.bot_tokens.is_empty()
    }
}

/// Telegram `parse_mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    Markdown,
    MarkdownV2,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
            ParseMode::Markdown => "Markdown",
            ParseMode::MarkdownV2 => "MarkdownV2",
        }
    }
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = NotifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HTML" | "html" => Ok(ParseMode::Html),
            "Markdown" | "markdown" => Ok(ParseMode::Markdown),
            "MarkdownV2" | "markdownv2" => Ok(ParseMode::MarkdownV2),
            other => Err(NotifierError::Config(format!("unknown parse mode: {other}"))),
        }
    }
}
