use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::{self, ApiState};
use crate::config::ScannerConfig;
use crate::scan::QuotaScanner;

pub struct ScannerServer {
    config: Arc<ScannerConfig>,
    scanner: Arc<QuotaScanner>,
}

impl ScannerServer {
    pub fn new(config: ScannerConfig) -> Result<Self> {
        let config = Arc::new(config);
        let scanner = Arc::new(QuotaScanner::new(&config)?);
        Ok(Self { config, scanner })
    }

    /// Periodic scan over the configured project list; `None` when no
    /// projects are configured and scans arrive only via the trigger API.
    pub fn start_scan_task(&self) -> Option<JoinHandle<()>> {
        if self.config.scan_projects.is_empty() {
            return None;
        }

        let scanner = Arc::clone(&self.scanner);
        let projects = self.config.scan_projects.clone();
        let period = Duration::from_secs(self.config.scan_interval_secs);

        Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                for project_id in &projects {
                    let summary = scanner.scan_project(project_id).await;
                    debug!(
                        project_id = %project_id,
                        rows_inserted = summary.rows_inserted,
                        "scheduled scan finished"
                    );
                }
            }
        }))
    }

    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .context("invalid listen address")?;

        let state = Arc::new(ApiState::new(
            Arc::clone(&self.scanner),
            Arc::clone(&self.config),
        ));
        let router = api::create_router(state);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        info!(%addr, "quota-scanner listening");

        axum::serve(listener, router).await.context("server error")
    }
}
