use quota_watch_warehouse::WarehouseClient;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::record::QuotaRecord;

/// Appends quota records to the warehouse table, one row per record. A
/// rejected row is logged and skipped; rows already written stay written.
pub struct RowSink {
    warehouse: WarehouseClient,
    dataset: String,
    table: String,
}

impl RowSink {
    pub fn new(warehouse: WarehouseClient, dataset: &str, table: &str) -> Self {
        Self {
            warehouse,
            dataset: dataset.to_string(),
            table: table.to_string(),
        }
    }

    pub async fn store(&self, records: &[QuotaRecord]) -> usize {
        let mut inserted = 0usize;

        for record in records {
            let row = quota_row(record);
            match self
                .warehouse
                .insert_row(&self.dataset, &self.table, &row)
                .await
            {
                Ok(()) => inserted += 1,
                Err(err) => {
                    error!(
                        limit_name = %record.limit_name,
                        region = %record.region,
                        error = %err,
                        "failed to insert quota row"
                    );
                }
            }
        }

        debug!(
            records = records.len(),
            inserted, "quota record batch sunk"
        );
        inserted
    }
}

/// Flat warehouse row for one record. Field names are contractual.
pub fn quota_row(record: &QuotaRecord) -> Value {
    let mut row = json!({
        "project_id": record.project_id,
        "added_at": record.timestamp,
        "region": record.region,
        "quota_metric": record.metric,
        "limit_name": record.limit_name,
        "quota_type": record.quota_type.as_str(),
        "current_usage": record.current_usage,
        "max_usage": record.max_usage,
        "quota_limit": record.quota_limit,
        "threshold": record.threshold,
    });

    if let Some(method) = &record.api_method {
        row["api_method"] = Value::String(method.clone());
    }
    row
}

#[cfg(test)]
mod tests {
    use super::super::record::QuotaType;
    use super::*;

    fn record(api_method: Option<&str>) -> QuotaRecord {
        QuotaRecord {
            project_id: "some-project".to_string(),
            region: "us-east1".to_string(),
            metric: "compute.googleapis.com/cpus".to_string(),
            limit_name: "CPUS-per-project-region".to_string(),
            api_method: api_method.map(str::to_string),
            quota_type: QuotaType::Allocation,
            current_usage: 250,
            max_usage: 400,
            quota_limit: 1000,
            threshold: 80,
            timestamp: "2026-08-05T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn row_uses_contractual_field_names() {
        let row = quota_row(&record(None));

        assert_eq!(row["project_id"], "some-project");
        assert_eq!(row["added_at"], "2026-08-05T00:00:00+00:00");
        assert_eq!(row["region"], "us-east1");
        assert_eq!(row["quota_metric"], "compute.googleapis.com/cpus");
        assert_eq!(row["limit_name"], "CPUS-per-project-region");
        assert_eq!(row["quota_type"], "ALLOCATION");
        assert_eq!(row["current_usage"], 250);
        assert_eq!(row["max_usage"], 400);
        assert_eq!(row["quota_limit"], 1000);
        assert_eq!(row["threshold"], 80);
    }

    #[test]
    fn api_method_column_is_conditional() {
        let without = quota_row(&record(None));
        assert!(without.get("api_method").is_none());

        let with = quota_row(&record(Some("compute.instances.insert")));
        assert_eq!(with["api_method"], "compute.instances.insert");
    }
}
