use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("monitoring API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
