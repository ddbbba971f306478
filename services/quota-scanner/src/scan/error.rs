use quota_watch_monitoring::MonitoringError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("field {0} missing from query response")]
    MissingField(String),
    #[error("series row has no points")]
    EmptyRow,
    #[error("monitoring query failed: {0}")]
    Monitoring(#[from] MonitoringError),
}
