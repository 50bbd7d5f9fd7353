//! `tg-notify` — send one notification into a Telegram group topic.
//!
//! Destination and bots come from the environment (see `NotifierConfig`).
//! Unlike the library's fire-and-forget `send`, the binary waits for the
//! dispatch to finish and exits non-zero if every bot failed.

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tglogger_common::config::NotifierConfig;
use tglogger_common::{CustomNotificationType, NotificationType, ParseMode, RunMode};
use tglogger_notifier::{NotificationDispatcher, format};

#[derive(Debug, Parser)]
#[command(name = "tg-notify", version, about = "Send a notification into a Telegram group topic")]
struct Args {
    /// Notification kind label (built-in unless --thread-id is given)
    #[arg(long, default_value = "debug")]
    kind: String,

    /// Explicit topic id; turns the kind into a custom one
    #[arg(long)]
    thread_id: Option<i64>,

    /// Send the text without a parse mode
    #[arg(long)]
    no_parse_mode: bool,

    /// Prepend the current UTC time to the message
    #[arg(long)]
    timestamp: bool,

    /// Message text
    text: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tglogger_notifier=info,tg_notify=info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = NotifierConfig::from_env()?;
    if args.no_parse_mode {
        config.parse_mode = None;
    }

    let dispatcher = NotificationDispatcher::from_config(&config);

    tracing::info!(
        chat_id = config.chat_id,
        bots = config.bot_tokens.len(),
        run_mode = %RunMode::current(),
        "Dispatching notification"
    );

    let text = if args.timestamp {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let stamp = match config.parse_mode {
            Some(ParseMode::Html) => format::html_tag("i", &now),
            _ => now,
        };
        format!("{stamp}\n\n{}", args.text)
    } else {
        args.text
    };

    let outcome = match args.thread_id {
        Some(thread_id) => {
            let kind = CustomNotificationType::new(args.kind, thread_id);
            dispatcher.dispatch(&text, &kind).await
        }
        None => {
            let kind: NotificationType = args.kind.parse()?;
            dispatcher.dispatch(&text, &kind).await
        }
    };

    if !outcome.is_delivered() {
        anyhow::bail!(
            "notification was not delivered ({} bot(s) tried)",
            outcome.attempts()
        );
    }

    tracing::info!(attempts = outcome.attempts(), "Notification delivered");
    Ok(())
}
