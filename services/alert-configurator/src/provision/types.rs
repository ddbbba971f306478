use serde::{Deserialize, Serialize};

/// One row of the alerting configuration table. The three resource ids
/// stay null until the first provisioning pass writes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppAlert {
    pub project_id: String,
    pub email_id: String,
    pub app_code: String,
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(default)]
    pub notification_channel_id: Option<String>,
    #[serde(default)]
    pub custom_log_metric_id: Option<String>,
    #[serde(default)]
    pub alert_policy_id: Option<String>,
}
