pub mod dispatcher;
pub mod format;
pub mod transport;

pub use dispatcher::{
    DeliverySettings, DispatchOutcome, MAX_MESSAGE_LENGTH, NotificationDispatcher,
};
pub use transport::BotTransport;
