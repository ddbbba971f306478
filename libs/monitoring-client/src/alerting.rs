use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MonitoringError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Documentation {
    pub content: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub alignment_period: String,
    pub per_series_aligner: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trigger {
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricThreshold {
    pub filter: String,
    pub comparison: String,
    pub duration: String,
    pub trigger: Trigger,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCondition {
    pub display_name: String,
    pub condition_threshold: MetricThreshold,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Documentation>,
    #[serde(default)]
    pub conditions: Vec<AlertCondition>,
    pub combiner: String,
    #[serde(default)]
    pub notification_channels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogMetric {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub filter: String,
}

/// Client for the alerting-resource APIs: notification channels and alert
/// policies under the v3 surface, log-based metrics under v2.
pub struct AlertingClient {
    http: Client,
    base_url: String,
}

impl AlertingClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn create_notification_channel(
        &self,
        project_id: &str,
        channel: &NotificationChannel,
    ) -> Result<NotificationChannel, MonitoringError> {
        let url = format!(
            "{}/v3/projects/{}/notificationChannels",
            self.base_url, project_id
        );
        debug!(project_id, display_name = %channel.display_name, "creating notification channel");
        self.execute(self.http.post(&url).json(channel)).await
    }

    /// Update in place; `name` is the fully qualified resource name the
    /// create call returned.
    pub async fn update_notification_channel(
        &self,
        name: &str,
        channel: &NotificationChannel,
    ) -> Result<NotificationChannel, MonitoringError> {
        let url = format!("{}/v3/{}", self.base_url, name);
        self.execute(self.http.patch(&url).json(channel)).await
    }

    pub async fn create_alert_policy(
        &self,
        project_id: &str,
        policy: &AlertPolicy,
    ) -> Result<AlertPolicy, MonitoringError> {
        let url = format!("{}/v3/projects/{}/alertPolicies", self.base_url, project_id);
        debug!(project_id, display_name = %policy.display_name, "creating alert policy");
        self.execute(self.http.post(&url).json(policy)).await
    }

    pub async fn update_alert_policy(
        &self,
        name: &str,
        policy: &AlertPolicy,
    ) -> Result<AlertPolicy, MonitoringError> {
        let url = format!("{}/v3/{}", self.base_url, name);
        self.execute(self.http.patch(&url).json(policy)).await
    }

    pub async fn create_log_metric(
        &self,
        project_id: &str,
        metric: &LogMetric,
    ) -> Result<LogMetric, MonitoringError> {
        let url = format!("{}/v2/projects/{}/metrics", self.base_url, project_id);
        debug!(project_id, name = %metric.name, "creating log-based metric");
        self.execute(self.http.post(&url).json(metric)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, MonitoringError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MonitoringError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|err| MonitoringError::InvalidResponse(err.to_string()))
    }
}
