use quota_watch_warehouse::WarehouseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("warehouse query failed: {0}")]
    Warehouse(#[from] WarehouseError),
    #[error("malformed alert row: {0}")]
    MalformedRow(String),
}
