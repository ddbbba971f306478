use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MonitoringError;
use crate::types::{TimeSeriesData, TimeSeriesDescriptor};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryTimeSeriesRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryTimeSeriesResponse {
    #[serde(default)]
    time_series_descriptor: TimeSeriesDescriptor,
    #[serde(default)]
    time_series_data: Vec<TimeSeriesData>,
    #[serde(default)]
    next_page_token: String,
}

/// Fully paginated result of one time-series query.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesResult {
    pub descriptor: TimeSeriesDescriptor,
    pub data: Vec<TimeSeriesData>,
}

pub struct QueryClient {
    http: Client,
    base_url: String,
}

impl QueryClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run a query in the given project scope and drain all result pages.
    /// The descriptor is taken from the first page; subsequent pages repeat it.
    pub async fn query_time_series(
        &self,
        project_id: &str,
        query: &str,
    ) -> Result<TimeSeriesResult, MonitoringError> {
        let url = format!("{}/v3/projects/{}/timeSeries:query", self.base_url, project_id);

        let mut descriptor: Option<TimeSeriesDescriptor> = None;
        let mut data = Vec::new();
        let mut page_token = String::new();
        let mut pages = 0usize;

        loop {
            let request = QueryTimeSeriesRequest {
                query,
                page_token: if page_token.is_empty() {
                    None
                } else {
                    Some(&page_token)
                },
            };

            let response = self.http.post(&url).json(&request).send().await?;
            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(MonitoringError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let page: QueryTimeSeriesResponse = response
                .json()
                .await
                .map_err(|err| MonitoringError::InvalidResponse(err.to_string()))?;

            if descriptor.is_none() {
                descriptor = Some(page.time_series_descriptor);
            }
            data.extend(page.time_series_data);
            pages += 1;

            if page.next_page_token.is_empty() {
                break;
            }
            page_token = page.next_page_token;
        }

        debug!(project_id, pages, rows = data.len(), "time-series query drained");

        Ok(TimeSeriesResult {
            descriptor: descriptor.unwrap_or_default(),
            data,
        })
    }
}
