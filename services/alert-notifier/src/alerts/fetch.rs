use quota_watch_warehouse::WarehouseClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::NotifyError;

/// One quota row that crossed its configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub project_id: String,
    pub region: String,
    pub metric: String,
    pub current_usage: i64,
    pub quota_limit: i64,
    pub consumption: f64,
}

pub struct AlertFetcher {
    warehouse: WarehouseClient,
    home_project: String,
    dataset: String,
    table: String,
}

impl AlertFetcher {
    pub fn new(warehouse: WarehouseClient, home_project: &str, dataset: &str, table: &str) -> Self {
        Self {
            warehouse,
            home_project: home_project.to_string(),
            dataset: dataset.to_string(),
            table: table.to_string(),
        }
    }

    /// Read every row of the alert view. A row that does not decode to an
    /// alert violates the view contract and fails the whole fetch.
    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>, NotifyError> {
        let sql = format!(
            "SELECT project_id, region, metric, current_usage, quota_limit, consumption \
             FROM `{}.{}.{}`",
            self.home_project, self.dataset, self.table
        );

        let rows = self.warehouse.query(&sql).await?;
        let mut alerts = Vec::with_capacity(rows.len());
        for row in rows {
            let alert: Alert = serde_json::from_value(row)
                .map_err(|err| NotifyError::MalformedRow(err.to_string()))?;
            alerts.push(alert);
        }

        debug!(alerts = alerts.len(), "alert view fetched");
        Ok(alerts)
    }
}
