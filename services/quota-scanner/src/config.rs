use std::env;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub server_host: String,
    pub server_port: u16,
    pub monitoring_api_url: String,
    pub warehouse_api_url: String,
    pub warehouse_project: String,
    pub warehouse_dataset: String,
    pub warehouse_table: String,
    pub threshold: i64,
    pub scan_projects: Vec<String>,
    pub scan_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8185,
            monitoring_api_url: "http://127.0.0.1:9090".to_string(),
            warehouse_api_url: "http://127.0.0.1:9091".to_string(),
            warehouse_project: "quota-watch-home".to_string(),
            warehouse_dataset: "quota_monitoring".to_string(),
            warehouse_table: "project_quotas".to_string(),
            threshold: 80,
            scan_projects: Vec::new(),
            scan_interval_secs: 3600,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(host) = env::var("SCANNER_HOST") {
            cfg.server_host = host;
        }
        if let Ok(port) = env::var("SCANNER_PORT") {
            cfg.server_port = port.parse().context("SCANNER_PORT must be a valid u16")?;
        }
        if let Ok(url) = env::var("MONITORING_API_URL") {
            cfg.monitoring_api_url = url;
        }
        if let Ok(url) = env::var("WAREHOUSE_API_URL") {
            cfg.warehouse_api_url = url;
        }
        if let Ok(project) = env::var("WAREHOUSE_PROJECT") {
            cfg.warehouse_project = project;
        }
        if let Ok(dataset) = env::var("WAREHOUSE_DATASET") {
            cfg.warehouse_dataset = dataset;
        }
        if let Ok(table) = env::var("WAREHOUSE_TABLE") {
            cfg.warehouse_table = table;
        }
        if let Ok(threshold) = env::var("THRESHOLD") {
            cfg.threshold = threshold
                .parse()
                .context("THRESHOLD must be an integer percentage")?;
        }
        if let Ok(projects) = env::var("SCAN_PROJECTS") {
            cfg.scan_projects = parse_project_list(&projects);
        }
        if let Ok(interval) = env::var("SCAN_INTERVAL_SECS") {
            cfg.scan_interval_secs = interval
                .parse()
                .context("SCAN_INTERVAL_SECS must be a positive integer")?;
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
        if self.monitoring_api_url.is_empty() {
            anyhow::bail!("MONITORING_API_URL cannot be empty");
        }
        if self.warehouse_api_url.is_empty() {
            anyhow::bail!("WAREHOUSE_API_URL cannot be empty");
        }
        if self.warehouse_project.is_empty()
            || self.warehouse_dataset.is_empty()
            || self.warehouse_table.is_empty()
        {
            anyhow::bail!("warehouse project, dataset and table must all be set");
        }
        if !(0..=100).contains(&self.threshold) {
            anyhow::bail!("THRESHOLD must be a percentage between 0 and 100");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        if !self.scan_projects.is_empty() && self.scan_interval_secs == 0 {
            anyhow::bail!("SCAN_INTERVAL_SECS must be greater than zero when SCAN_PROJECTS is set");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_project_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
