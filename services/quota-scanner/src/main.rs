use anyhow::{Context, Result};
use quota_watch_scanner::config::ScannerConfig;
use quota_watch_scanner::server::ScannerServer;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ScannerConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level);

    info!(
        monitoring_api = %config.monitoring_api_url,
        warehouse_api = %config.warehouse_api_url,
        table = %config.warehouse_table,
        scheduled_projects = config.scan_projects.len(),
        "quota-scanner service starting"
    );

    let server = ScannerServer::new(config).context("failed to create scanner server")?;
    let _scan_task = server.start_scan_task();

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

    info!("quota-scanner service stopped");
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
