pub mod error;
pub mod fetch;
pub mod message;

pub use error::NotifyError;
pub use fetch::{Alert, AlertFetcher};
pub use message::build_alert_message;
