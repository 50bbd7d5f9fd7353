pub mod config;
pub mod error;
pub mod types;

pub use error::{NotifierError, Result};
pub use types::{
    CustomNotificationType, DEBUG_THREAD_ID, Destination, NotificationKind, NotificationType,
    ParseMode, RunMode,
};
