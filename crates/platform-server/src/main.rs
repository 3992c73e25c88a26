//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: agentns — Secure naming and discovery for AI agents.
//

//! agentns platform server — thin entry point for the Axum HTTP service.
//!
//! Routing lives in `agentns_platform::http::create_router`; this binary is
//! responsible only for CLI parsing, env config loading, platform wiring in
//! startup order (CA → RA → registry → HTTP), server binding, and graceful
//! shutdown.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use agentns_platform::audit::TracingAuditSink;
use agentns_platform::bootstrap::bootstrap;
use agentns_platform::http::{create_router, AppState, Config};
#[cfg(not(feature = "postgres"))]
use agentns_platform::storage::MemoryStore;
#[cfg(feature = "postgres")]
use agentns_platform::storage::PostgresStore;
use agentns_platform::storage::StoragePort;

/// agentns platform server — boots the agent name service.
#[derive(Parser)]
#[command(
    name = "agentns-platform-server",
    version = env!("CARGO_PKG_VERSION"),
    about = "agentns platform server — secure naming and discovery for AI agents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Migrate => migrate().await,
    }
}

async fn serve() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    #[cfg(feature = "postgres")]
    let mode = "full (postgres)";
    #[cfg(not(feature = "postgres"))]
    let mode = "in-memory";

    tracing::info!(
        "agentns-platform-server v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Port: {}", config.port);
    tracing::info!("Mode: {}", mode);
    tracing::info!(
        "Routes: POST /register, POST /renew, POST /revoke, POST /resolve, \
         GET /agents, GET+POST /ocsp, GET /ca/certificate, GET /schemas, GET /health"
    );

    let store: Arc<dyn StoragePort> = build_store(&config).await?;
    let audit = Arc::new(TracingAuditSink);

    let platform = bootstrap(config.platform_options(), store, audit).await?;
    let state = AppState::from(&platform);

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!("Listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down cleanly");

    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_store(config: &Config) -> Result<Arc<dyn StoragePort>> {
    let store = PostgresStore::connect(&config.database_url).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn build_store(_config: &Config) -> Result<Arc<dyn StoragePort>> {
    Ok(Arc::new(MemoryStore::new()))
}

async fn migrate() -> Result<()> {
    #[cfg(feature = "postgres")]
    {
        tracing_subscriber::fmt::init();
        let config = Config::from_env()?;
        let store = PostgresStore::connect(&config.database_url).await?;
        store.run_migrations().await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    #[cfg(not(feature = "postgres"))]
    {
        Err(anyhow::anyhow!(
            "Built without postgres feature — migrations not available"
        ))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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

    tracing::info!("Shutdown signal received, draining connections...");
}
