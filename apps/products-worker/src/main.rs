//! Products Worker
//!
//! Connects to Postgres and NATS, then answers product commands until SIGINT/SIGTERM.

use core_config::{FromEnv, tracing::init_tracing, tracing::install_color_eyre};
use database::postgres::{check_health, connect_from_config_with_retry, run_migrations};
use domain_products::{PgProductRepository, ProductService};
use eyre::{Result, WrapErr};
use migration::Migrator;
use products_worker::config::Config;
use products_worker::handlers::ProductCommandHandler;
use products_worker::messaging::NatsBroker;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    init_tracing(&config.environment);

    info!("Starting products worker");

    let db = connect_from_config_with_retry(config.database.clone(), None)
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;
    check_health(&db).await.wrap_err("Database health check failed")?;

    if config.run_migrations {
        run_migrations::<Migrator>(&db, "products_worker")
            .await
            .wrap_err("Failed to run migrations")?;
    }

    let broker = Arc::new(NatsBroker::connect(&config.nats).await?);

    let service = ProductService::new(PgProductRepository::new(db.clone()));
    let handler = ProductCommandHandler::new(broker.clone(), service, &config.nats.queue_group);

    tokio::select! {
        result = handler.run() => result?,
        _ = shutdown_signal() => info!("Shutdown signal received"),
    }

    broker.flush().await?;
    db.close().await.wrap_err("Failed to close database pool")?;

    info!("Products worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
