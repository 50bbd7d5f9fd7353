use serde::Deserialize;

use crate::types::{Destination, ParseMode};

/// Default Telegram Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Notifier configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Destination chat (group with forum topics)
    pub chat_id: i64,

    /// Bot tokens allowed to post into the chat; empty disables delivery
    pub bot_tokens: Vec<String>,

    /// Bot API base URL (default: https://api.telegram.org)
    pub api_base: String,

    /// Per-attempt request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// `parse_mode` sent with every message; `None` sends plain text
    pub parse_mode: Option<ParseMode>,
}

impl NotifierConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chat_id = lookup("TELEGRAM_CHAT_ID")
            .ok_or_else(|| anyhow::anyhow!("TELEGRAM_CHAT_ID environment variable is required"))?
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("TELEGRAM_CHAT_ID must be a valid i64"))?;

        let bot_tokens = lookup("TELEGRAM_BOT_TOKENS")
            .ok_or_else(|| {
                anyhow::anyhow!("TELEGRAM_BOT_TOKENS environment variable is required")
            })
            .map(|raw| parse_token_list(&raw))?;

        let parse_mode = match lookup("TELEGRAM_PARSE_MODE") {
            None => Some(ParseMode::Html),
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(raw.parse().map_err(|_| {
                anyhow::anyhow!("TELEGRAM_PARSE_MODE must be HTML, Markdown, MarkdownV2 or none")
            })?),
        };

        Ok(Self {
            chat_id,
            bot_tokens,
            api_base: lookup("TELEGRAM_API_BASE")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            request_timeout_secs: lookup("TELEGRAM_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("TELEGRAM_REQUEST_TIMEOUT_SECS must be a valid u64"))?,
            parse_mode,
        })
    }

    pub fn destination(&self) -> Destination {
        Destination::new(self.chat_id, self.bot_tokens.clone())
    }
}

fn parse_token_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = NotifierConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_CHAT_ID", "-1001234567890"),
            ("TELEGRAM_BOT_TOKENS", "111:AAA, 222:BBB ,,"),
        ]))
        .unwrap();

        assert_eq!(config.chat_id, -1001234567890);
        assert_eq!(config.bot_tokens, vec!["111:AAA", "222:BBB"]);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.parse_mode, Some(ParseMode::Html));
        assert_eq!(config.destination().bot_tokens.len(), 2);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = NotifierConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_CHAT_ID", "42"),
            ("TELEGRAM_BOT_TOKENS", ""),
            ("TELEGRAM_API_BASE", "http://127.0.0.1:8081/"),
            ("TELEGRAM_REQUEST_TIMEOUT_SECS", "5"),
            ("TELEGRAM_PARSE_MODE", "none"),
        ]))
        .unwrap();

        assert!(config.bot_tokens.is_empty());
        assert!(!config.destination().is_enabled());
        assert_eq!(config.api_base, "http://127.0.0.1:8081");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.parse_mode, None);
    }

    #[test]
    fn test_from_lookup_requires_chat_id() {
        let err = NotifierConfig::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKENS", "1:A")]))
            .unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(NotifierConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_CHAT_ID", "not-a-number"),
            ("TELEGRAM_BOT_TOKENS", "1:A"),
        ]))
        .is_err());

        assert!(NotifierConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_CHAT_ID", "1"),
            ("TELEGRAM_BOT_TOKENS", "1:A"),
            ("TELEGRAM_PARSE_MODE", "bbcode"),
        ]))
        .is_err());
    }
}
