use thiserror::Error;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("warehouse API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("row rejected: {0}")]
    RowRejected(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
