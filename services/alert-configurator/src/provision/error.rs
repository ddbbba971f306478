use quota_watch_monitoring::MonitoringError;
use quota_watch_warehouse::WarehouseError;
use thiserror::Error;

use crate::seed::SeedError;

#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("seed file rejected: {0}")]
    Seed(#[from] SeedError),
    #[error("failed to fetch seed CSV: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("warehouse call failed: {0}")]
    Warehouse(#[from] WarehouseError),
    #[error("monitoring call failed: {0}")]
    Monitoring(#[from] MonitoringError),
    #[error("duplicate app code {0:?} in configuration table")]
    DuplicateAppCode(String),
    #[error("malformed configuration row: {0}")]
    MalformedRow(String),
    #[error("{0} response carried no resource name")]
    MissingResourceName(&'static str),
}

impl ConfigureError {
    /// Integrity violations abort the pass with no partial write; the
    /// caller maps them apart from plain upstream failures.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            ConfigureError::Seed(_) | ConfigureError::DuplicateAppCode(_)
        )
    }
}
