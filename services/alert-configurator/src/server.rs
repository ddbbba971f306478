use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, ApiState};
use crate::config::ConfiguratorConfig;
use crate::provision::Provisioner;

pub struct ConfiguratorServer {
    config: Arc<ConfiguratorConfig>,
    provisioner: Provisioner,
}

impl ConfiguratorServer {
    pub fn new(config: ConfiguratorConfig) -> Result<Self> {
        let provisioner = Provisioner::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            provisioner,
        })
    }

    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .context("invalid listen address")?;

        let state = Arc::new(ApiState::new(self.provisioner, Arc::clone(&self.config)));
        let router = api::create_router(state);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        info!(%addr, "alert-configurator listening");

        axum::serve(listener, router).await.context("server error")
    }
}
