use std::env;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct ConfiguratorConfig {
    pub server_host: String,
    pub server_port: u16,
    pub warehouse_api_url: String,
    pub monitoring_api_url: String,
    pub home_project: String,
    pub app_alert_dataset: String,
    pub app_alert_table: String,
    pub csv_source_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8187,
            warehouse_api_url: "http://127.0.0.1:9091".to_string(),
            monitoring_api_url: "http://127.0.0.1:9090".to_string(),
            home_project: "quota-watch-home".to_string(),
            app_alert_dataset: "quota_monitoring".to_string(),
            app_alert_table: "app_alerts".to_string(),
            csv_source_url: String::new(),
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl ConfiguratorConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(host) = env::var("CONFIGURATOR_HOST") {
            cfg.server_host = host;
        }
        if let Ok(port) = env::var("CONFIGURATOR_PORT") {
            cfg.server_port = port
                .parse()
                .context("CONFIGURATOR_PORT must be a valid u16")?;
        }
        if let Ok(url) = env::var("WAREHOUSE_API_URL") {
            cfg.warehouse_api_url = url;
        }
        if let Ok(url) = env::var("MONITORING_API_URL") {
            cfg.monitoring_api_url = url;
        }
        if let Ok(project) = env::var("HOME_PROJECT") {
            cfg.home_project = project;
        }
        if let Ok(dataset) = env::var("APP_ALERT_DATASET") {
            cfg.app_alert_dataset = dataset;
        }
        if let Ok(table) = env::var("APP_ALERT_TABLE") {
            cfg.app_alert_table = table;
        }
        if let Ok(url) = env::var("CSV_SOURCE_URL") {
            cfg.csv_source_url = url;
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = timeout
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a positive integer")?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            cfg.log_level = level;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.warehouse_api_url.is_empty() || self.monitoring_api_url.is_empty() {
            anyhow::bail!("WAREHOUSE_API_URL and MONITORING_API_URL must both be set");
        }
        if self.home_project.is_empty()
            || self.app_alert_dataset.is_empty()
            || self.app_alert_table.is_empty()
        {
            anyhow::bail!("HOME_PROJECT, APP_ALERT_DATASET and APP_ALERT_TABLE must all be set");
        }
        if self.csv_source_url.is_empty() {
            anyhow::bail!("CSV_SOURCE_URL cannot be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
