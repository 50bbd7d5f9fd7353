use std::time::Duration;

use thiserror::Error;

/// Errors produced while delivering a notification through one bot.
///
/// These never cross the fire-and-forget `send` boundary; the dispatcher
/// logs them and moves on to the next bot.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl NotifierError {
    /// Whether this failure came from the network layer rather than from a
    /// response the Bot API actually sent back.
    pub fn is_network(&self) -> bool {
        matches!(self, NotifierError::Http(_) | NotifierError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message_includes_body() {
        let err = NotifierError::Status {
            status: 400,
            body: r#"{"ok":false,"description":"Bad Request: message thread not found"}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("message thread not found"));
        assert!(!err.is_network());
    }

    #[test]
    fn test_timeout_is_network() {
        let err = NotifierError::Timeout(Duration::from_secs(30));
        assert!(err.is_network());
        assert!(!NotifierError::RateLimited { retry_after: Some(3) }.is_network());
    }
}
