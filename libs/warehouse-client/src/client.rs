use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::WarehouseError;

#[derive(Debug, Serialize)]
struct InsertAllRequest<'a> {
    rows: Vec<InsertRow<'a>>,
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    json: &'a Value,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<InsertErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertErrorEntry {
    index: usize,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    job_id: String,
    use_legacy_sql: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    rows: Vec<Value>,
}

/// One rejected row from a batch insert, reported back to the caller
/// instead of failing the whole request.
#[derive(Debug, Clone)]
pub struct RowInsertError {
    pub index: usize,
    pub message: String,
}

pub struct WarehouseClient {
    http: Client,
    base_url: String,
    project: String,
}

impl WarehouseClient {
    pub fn new(base_url: &str, project: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
        })
    }

    /// Append a batch of rows. Rows the warehouse rejects are returned as
    /// per-row errors; rows before and after a rejected one still land.
    pub async fn insert_rows(
        &self,
        dataset: &str,
        table: &str,
        rows: &[Value],
    ) -> Result<Vec<RowInsertError>, WarehouseError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/projects/{}/datasets/{}/tables/{}/insertAll",
            self.base_url, self.project, dataset, table
        );
        let request = InsertAllRequest {
            rows: rows.iter().map(|json| InsertRow { json }).collect(),
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: InsertAllResponse = response
            .json()
            .await
            .map_err(|err| WarehouseError::InvalidResponse(err.to_string()))?;

        Ok(body
            .insert_errors
            .into_iter()
            .map(|entry| RowInsertError {
                index: entry.index,
                message: format_row_errors(&entry.errors),
            })
            .collect())
    }

    /// Append one row; a per-row rejection surfaces as `RowRejected`.
    pub async fn insert_row(
        &self,
        dataset: &str,
        table: &str,
        row: &Value,
    ) -> Result<(), WarehouseError> {
        let errors = self
            .insert_rows(dataset, table, std::slice::from_ref(row))
            .await?;

        match errors.into_iter().next() {
            Some(error) => Err(WarehouseError::RowRejected(error.message)),
            None => Ok(()),
        }
    }

    /// Run a SQL statement as a one-shot job and return the result rows.
    /// Each query gets a fresh job id so the warehouse can dedupe resubmits.
    pub async fn query(&self, sql: &str) -> Result<Vec<Value>, WarehouseError> {
        let url = format!("{}/projects/{}/queries", self.base_url, self.project);
        let request = QueryRequest {
            query: sql,
            job_id: Uuid::new_v4().to_string(),
            use_legacy_sql: false,
        };

        debug!(job_id = %request.job_id, "submitting warehouse query");

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|err| WarehouseError::InvalidResponse(err.to_string()))?;

        if !body.job_complete {
            return Err(WarehouseError::InvalidResponse(
                "query job did not complete".to_string(),
            ));
        }

        Ok(body.rows)
    }
}

fn format_row_errors(errors: &[ErrorProto]) -> String {
    if errors.is_empty() {
        return "unspecified insert error".to_string();
    }
    errors
        .iter()
        .map(|e| {
            if e.reason.is_empty() {
                e.message.clone()
            } else {
                format!("{}: {}", e.reason, e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
