use anyhow::{Context, Result};
use quota_watch_notifier::config::NotifierConfig;
use quota_watch_notifier::server::NotifierServer;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NotifierConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level);

    info!(
        warehouse_api = %config.warehouse_api_url,
        table = %config.alert_table,
        "alert-notifier service starting"
    );

    let server = NotifierServer::new(config).context("failed to create notifier server")?;

    tokio::select! {
        result = server.run() => {
            if let Err(err) = result {
                error!(error = %err, "server error");
                return Err(err);
            }
        }
        _ = shutdown_signal() => {
            info!("received shutdown signal");
        }
    }

    info!("alert-notifier service stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
