use std::collections::{HashMap, HashSet};
use std::time::Duration;

use quota_watch_monitoring::{
    Aggregation, AlertCondition, AlertPolicy, AlertingClient, Documentation, LogMetric,
    MetricThreshold, NotificationChannel, Trigger,
};
use quota_watch_warehouse::WarehouseClient;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::config::ConfiguratorConfig;
use crate::seed::{parse_seed_csv, SeedRow};

use super::error::ConfigureError;
use super::types::AppAlert;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ConfigureSummary {
    pub seeded_rows: usize,
    pub configured_apps: usize,
    pub failed_apps: usize,
}

/// Runs one full configuration pass: seed the table from the CSV source
/// when it is empty, then provision log metric, notification channel and
/// alert policy for every row and write the assigned ids back.
pub struct Provisioner {
    alerting: AlertingClient,
    warehouse: WarehouseClient,
    http: reqwest::Client,
    home_project: String,
    dataset: String,
    table: String,
    csv_source_url: String,
}

impl Provisioner {
    pub fn new(config: &ConfiguratorConfig) -> anyhow::Result<Self> {
        let alerting = AlertingClient::new(&config.monitoring_api_url, config.request_timeout_secs)?;
        let warehouse = WarehouseClient::new(
            &config.warehouse_api_url,
            &config.home_project,
            config.request_timeout_secs,
        )?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            alerting,
            warehouse,
            http,
            home_project: config.home_project.clone(),
            dataset: config.app_alert_dataset.clone(),
            table: config.app_alert_table.clone(),
            csv_source_url: config.csv_source_url.clone(),
        })
    }

    pub async fn run(&self) -> Result<ConfigureSummary, ConfigureError> {
        let seeded_rows = self.bootstrap_if_empty().await?;
        let (configured_apps, failed_apps) = self.configure_all().await?;

        Ok(ConfigureSummary {
            seeded_rows,
            configured_apps,
            failed_apps,
        })
    }

    /// Load the seed CSV into the configuration table, but only on the
    /// very first run; a non-empty table is maintained with DML from
    /// then on.
    async fn bootstrap_if_empty(&self) -> Result<usize, ConfigureError> {
        if self.table_row_count().await? > 0 {
            debug!("configuration table already initialized; skipping CSV load");
            return Ok(0);
        }

        let body = self
            .http
            .get(&self.csv_source_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let rows = parse_seed_csv(&body)?;
        info!(rows = rows.len(), "seed CSV validated; loading configuration table");

        let payload: Vec<Value> = rows.iter().map(seed_row_json).collect();
        let rejected = self
            .warehouse
            .insert_rows(&self.dataset, &self.table, &payload)
            .await?;
        for row_error in &rejected {
            error!(
                index = row_error.index,
                message = %row_error.message,
                "seed row rejected by warehouse"
            );
        }

        Ok(payload.len() - rejected.len())
    }

    async fn configure_all(&self) -> Result<(usize, usize), ConfigureError> {
        let app_alerts = self.list_app_alerts().await?;
        ensure_unique_app_codes(&app_alerts)?;

        let mut configured = 0usize;
        let mut failed = 0usize;

        for mut app_alert in app_alerts {
            if let Err(err) = self.provision_app(&mut app_alert).await {
                error!(
                    app_code = %app_alert.app_code,
                    error = %err,
                    "failed to provision alerting resources"
                );
                failed += 1;
                continue;
            }
            if let Err(err) = self.update_app_alert(&app_alert).await {
                error!(
                    app_code = %app_alert.app_code,
                    error = %err,
                    "failed to write back resource ids"
                );
                failed += 1;
                continue;
            }
            configured += 1;
        }

        info!(configured, failed, "app alert configuration pass complete");
        Ok((configured, failed))
    }

    async fn table_row_count(&self) -> Result<i64, ConfigureError> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM `{}.{}.{}`",
            self.home_project, self.dataset, self.table
        );
        let rows = self.warehouse.query(&sql).await?;
        let count = rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(count)
    }

    async fn list_app_alerts(&self) -> Result<Vec<AppAlert>, ConfigureError> {
        let sql = format!(
            "SELECT * FROM `{}.{}.{}`",
            self.home_project, self.dataset, self.table
        );
        let rows = self.warehouse.query(&sql).await?;

        let mut app_alerts = Vec::with_capacity(rows.len());
        for row in rows {
            let app_alert: AppAlert = serde_json::from_value(row)
                .map_err(|err| ConfigureError::MalformedRow(err.to_string()))?;
            app_alerts.push(app_alert);
        }
        Ok(app_alerts)
    }

    async fn provision_app(&self, app_alert: &mut AppAlert) -> Result<(), ConfigureError> {
        let metric_id = self.ensure_log_metric(app_alert).await?;
        app_alert.custom_log_metric_id = Some(metric_id.clone());

        let channel_id = self.ensure_notification_channel(app_alert).await?;
        app_alert.notification_channel_id = Some(channel_id.clone());

        let policy_id = self
            .ensure_alert_policy(app_alert, &channel_id, &metric_id)
            .await?;
        app_alert.alert_policy_id = Some(policy_id);

        Ok(())
    }

    /// Created once per app code; an existing metric is never touched.
    async fn ensure_log_metric(&self, app_alert: &AppAlert) -> Result<String, ConfigureError> {
        if let Some(id) = &app_alert.custom_log_metric_id {
            return Ok(id.clone());
        }

        let metric = LogMetric {
            name: format!("resource_usage_{}", app_alert.app_code),
            description: format!(
                "Tracks logs for quota usage above threshold for app_code {}",
                app_alert.app_code
            ),
            filter: format!(
                "logName:\"projects/{}/logs/\" jsonPayload.message:\"|AppCode-{} | ProjectId | Scope |\"",
                self.home_project, app_alert.app_code
            ),
        };

        let created = self
            .alerting
            .create_log_metric(&self.home_project, &metric)
            .await?;
        info!(app_code = %app_alert.app_code, metric = %created.name, "created custom log metric");
        Ok(created.name)
    }

    /// Create the email channel on first sight, update it in place after
    /// that so an email change in the table propagates.
    async fn ensure_notification_channel(
        &self,
        app_alert: &AppAlert,
    ) -> Result<String, ConfigureError> {
        let channel = NotificationChannel {
            name: app_alert.notification_channel_id.clone(),
            channel_type: "email".to_string(),
            display_name: format!("OnCall-{}", app_alert.app_code),
            description: format!(
                "Email channel for alert notifications on app {}",
                app_alert.app_code
            ),
            labels: HashMap::from([("email_address".to_string(), app_alert.email_id.clone())]),
        };

        let result = match &app_alert.notification_channel_id {
            Some(name) => {
                self.alerting
                    .update_notification_channel(name, &channel)
                    .await?
            }
            None => {
                self.alerting
                    .create_notification_channel(&self.home_project, &channel)
                    .await?
            }
        };

        result
            .name
            .ok_or(ConfigureError::MissingResourceName("notification channel"))
    }

    async fn ensure_alert_policy(
        &self,
        app_alert: &AppAlert,
        channel_id: &str,
        metric_id: &str,
    ) -> Result<String, ConfigureError> {
        let condition = AlertCondition {
            display_name: format!("QuotaExceedAlertPolicy-{}", app_alert.app_code),
            condition_threshold: MetricThreshold {
                filter: format!(
                    "metric.type=\"logging.googleapis.com/user/{}\"",
                    metric_id
                ),
                comparison: "COMPARISON_GT".to_string(),
                duration: "60s".to_string(),
                trigger: Trigger { count: 1 },
                aggregations: vec![Aggregation {
                    alignment_period: "60s".to_string(),
                    per_series_aligner: "ALIGN_COUNT".to_string(),
                }],
            },
        };

        let documentation = Documentation {
            content: format!(
                "**Resource usage quota is reaching threshold in project - {}<br /> \
                 [See Quota Dashboard for details]({})**",
                app_alert.project_id,
                app_alert.dashboard_url.as_deref().unwrap_or("")
            ),
            mime_type: "text/markdown".to_string(),
        };

        let policy = AlertPolicy {
            name: app_alert.alert_policy_id.clone(),
            display_name: format!("QuotaExceedAlertPolicy-{}", app_alert.app_code),
            documentation: Some(documentation),
            conditions: vec![condition],
            combiner: "OR".to_string(),
            notification_channels: vec![channel_id.to_string()],
        };

        let result = match &app_alert.alert_policy_id {
            Some(name) => self.alerting.update_alert_policy(name, &policy).await?,
            None => {
                self.alerting
                    .create_alert_policy(&self.home_project, &policy)
                    .await?
            }
        };

        result
            .name
            .ok_or(ConfigureError::MissingResourceName("alert policy"))
    }

    async fn update_app_alert(&self, app_alert: &AppAlert) -> Result<(), ConfigureError> {
        let sql = format!(
            "UPDATE `{}.{}.{}` SET custom_log_metric_id = \"{}\", \
             notification_channel_id = \"{}\", alert_policy_id = \"{}\" \
             WHERE app_code = \"{}\"",
            self.home_project,
            self.dataset,
            self.table,
            app_alert.custom_log_metric_id.as_deref().unwrap_or(""),
            app_alert.notification_channel_id.as_deref().unwrap_or(""),
            app_alert.alert_policy_id.as_deref().unwrap_or(""),
            app_alert.app_code
        );
        self.warehouse.query(&sql).await?;
        Ok(())
    }
}

/// Reject the whole pass on a duplicate app code, before any
/// create/update call goes out.
fn ensure_unique_app_codes(app_alerts: &[AppAlert]) -> Result<(), ConfigureError> {
    let mut seen = HashSet::new();
    for app_alert in app_alerts {
        if !seen.insert(app_alert.app_code.as_str()) {
            return Err(ConfigureError::DuplicateAppCode(app_alert.app_code.clone()));
        }
    }
    Ok(())
}

fn seed_row_json(row: &SeedRow) -> Value {
    json!({
        "project_id": row.project_id,
        "email_id": row.email_id,
        "app_code": row.app_code,
        "dashboard_url": row.dashboard_url,
        "notification_channel_id": Value::Null,
        "custom_log_metric_id": Value::Null,
        "alert_policy_id": Value::Null,
    })
}
