use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use quota_watch_warehouse::WarehouseClient;
use tokio::net::TcpListener;
use tracing::info;

use crate::alerts::AlertFetcher;
use crate::api::{self, ApiState};
use crate::config::NotifierConfig;

pub struct NotifierServer {
    config: Arc<NotifierConfig>,
    fetcher: AlertFetcher,
}

impl NotifierServer {
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let config = Arc::new(config);
        let warehouse = WarehouseClient::new(
            &config.warehouse_api_url,
            &config.home_project,
            config.request_timeout_secs,
        )?;
        let fetcher = AlertFetcher::new(
            warehouse,
            &config.home_project,
            &config.alert_dataset,
            &config.alert_table,
        );

        Ok(Self { config, fetcher })
    }

    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .context("invalid listen address")?;

        let state = Arc::new(ApiState::new(self.fetcher, Arc::clone(&self.config)));
        let router = api::create_router(state);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        info!(%addr, "alert-notifier listening");

        axum::serve(listener, router).await.context("server error")
    }
}
