pub mod bootstrap;
pub mod clientes;
pub mod docs;
pub mod health;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use clientes_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use clientes_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.db_pool.clone(),
    )
    .await?;

    let router = clientes::router(app.db_pool.clone()).merge(docs::router());
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "clientes-server started"
    );

    // Drain in-flight connections after ctrl-c, but only for the
    // configured grace period.
    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let serve = axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown());
    tokio::select! {
        result = serve => result?,
        () = deadline_after(wait_for_shutdown(), grace) => {
            tracing::warn!(
                event_name = "system.server.shutdown_deadline",
                grace_secs = grace.as_secs(),
                "graceful shutdown deadline reached, dropping in-flight connections"
            );
        }
    }

    tracing::info!(event_name = "system.server.stopping", "clientes-server stopping");

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn deadline_after(signal: impl Future<Output = ()>, grace: Duration) {
    signal.await;
    tokio::time::sleep(grace).await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::deadline_after;

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_one_grace_period_after_the_signal() {
        let start = tokio::time::Instant::now();

        deadline_after(async {}, Duration::from_secs(15)).await;

        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_does_not_start_counting_before_the_signal() {
        let signal = async { tokio::time::sleep(Duration::from_secs(5)).await };
        let start = tokio::time::Instant::now();

        deadline_after(signal, Duration::from_secs(15)).await;

        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }
}
