use chrono::{DateTime, Utc};
use quota_watch_monitoring::QueryClient;
use quota_watch_warehouse::WarehouseClient;
use serde::Serialize;
use tracing::{error, info};

use crate::config::ScannerConfig;

use super::error::ScanError;
use super::index::FieldIndex;
use super::queries::{allocation_query, Granularity};
use super::rate::collect_rate_records;
use super::record::{QuotaRecord, QuotaType};
use super::sink::RowSink;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanSummary {
    pub allocation_records: usize,
    pub rate_records: usize,
    pub rows_inserted: usize,
}

/// Scans one project's quota usage and appends the records to the
/// warehouse. Allocation and each rate granularity contribute
/// independently; a failing contribution is logged and the rest proceed.
pub struct QuotaScanner {
    query_client: QueryClient,
    sink: RowSink,
    threshold: i64,
}

impl QuotaScanner {
    pub fn new(config: &ScannerConfig) -> anyhow::Result<Self> {
        let query_client =
            QueryClient::new(&config.monitoring_api_url, config.request_timeout_secs)?;
        let warehouse = WarehouseClient::new(
            &config.warehouse_api_url,
            &config.warehouse_project,
            config.request_timeout_secs,
        )?;
        let sink = RowSink::new(warehouse, &config.warehouse_dataset, &config.warehouse_table);

        Ok(Self {
            query_client,
            sink,
            threshold: config.threshold,
        })
    }

    pub async fn scan_project(&self, project_id: &str) -> ScanSummary {
        let now = Utc::now();
        let mut summary = ScanSummary::default();

        match self.scan_allocation(project_id, now).await {
            Ok((records, inserted)) => {
                summary.allocation_records = records;
                summary.rows_inserted += inserted;
            }
            Err(err) => {
                error!(project_id, error = %err, "allocation quota scan failed");
            }
        }

        for granularity in Granularity::ALL {
            match self.scan_rate(project_id, granularity, now).await {
                Ok((records, inserted)) => {
                    summary.rate_records += records;
                    summary.rows_inserted += inserted;
                }
                Err(err) => {
                    error!(
                        project_id,
                        granularity = granularity.label(),
                        error = %err,
                        "rate quota scan failed"
                    );
                }
            }
        }

        info!(
            project_id,
            allocation_records = summary.allocation_records,
            rate_records = summary.rate_records,
            rows_inserted = summary.rows_inserted,
            "project quota scan complete"
        );
        summary
    }

    async fn scan_allocation(
        &self,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(usize, usize), ScanError> {
        let result = self
            .query_client
            .query_time_series(project_id, &allocation_query(project_id))
            .await?;

        let index = FieldIndex::from_descriptor(&result.descriptor);
        let timestamp = now.to_rfc3339();
        let mut records = Vec::with_capacity(result.data.len());
        for row in &result.data {
            records.push(QuotaRecord::build(
                row,
                &index,
                QuotaType::Allocation,
                None,
                self.threshold,
                &timestamp,
            )?);
        }

        let inserted = self.sink.store(&records).await;
        Ok((records.len(), inserted))
    }

    async fn scan_rate(
        &self,
        project_id: &str,
        granularity: Granularity,
        now: DateTime<Utc>,
    ) -> Result<(usize, usize), ScanError> {
        let result = self
            .query_client
            .query_time_series(project_id, &granularity.query(project_id))
            .await?;

        let records = collect_rate_records(&result, granularity, self.threshold, now)?;
        let inserted = self.sink.store(&records).await;
        Ok((records.len(), inserted))
    }
}
