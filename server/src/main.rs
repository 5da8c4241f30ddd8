// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Credvault Server
//!
//! Entry point for the `credvault-server` binary. Parses CLI arguments,
//! initializes logging and metrics, opens the vault, and serves the REST API.
//!
//! - `run`     - start the API and metrics servers
//! - `version` - print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use credvault::config::{VaultConfig, SIGNING_ALGORITHM, SYMMETRIC_ALGORITHM};
use credvault::storage::VaultDb;
use credvault::VaultService;

use cli::{Commands, CredvaultCli};
use logging::LogFormat;
use metrics::VaultMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CredvaultCli::parse();

    match cli.command {
        Commands::Run(args) => run_server(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens the vault and serves the API and metrics endpoints until shutdown.
async fn run_server(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&args.log_format),
    );

    let config = VaultConfig {
        share_token_ttl_secs: args.share_ttl_secs,
        max_payload_bytes: args.max_payload_bytes,
    };
    if let Err(e) = config.validate() {
        bail!("invalid configuration: {e}");
    }

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        share_ttl_secs = config.share_token_ttl_secs,
        max_payload_bytes = config.max_payload_bytes,
        "starting credvault-server"
    );

    // --- Vault ---
    let service = match &args.data_dir {
        Some(data_dir) => {
            let db_path = data_dir.join("db");
            std::fs::create_dir_all(&db_path).with_context(|| {
                format!("failed to create database directory: {}", db_path.display())
            })?;
            let db = Arc::new(
                VaultDb::open(&db_path)
                    .with_context(|| format!("failed to open database at {}", db_path.display()))?,
            );
            tracing::info!(path = %db_path.display(), "database opened");
            VaultService::new(db.clone(), db, config)
        }
        None => {
            tracing::warn!("no --data-dir given; wallet and credentials live in memory only");
            VaultService::in_memory(config)
        }
    };

    match service.wallet() {
        Ok(wallet) => tracing::info!(did = %wallet.did, "wallet loaded"),
        Err(credvault::VaultError::WalletNotInitialized) => {
            tracing::info!("no wallet yet; POST /api/wallet to provision one")
        }
        Err(e) => return Err(e).context("failed to load wallet"),
    }

    // --- Metrics ---
    let vault_metrics = Arc::new(VaultMetrics::new());

    // --- Application state ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: Arc::new(service),
        metrics: Arc::clone(&vault_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&vault_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("credvault-server stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("credvault-server {}", env!("CARGO_PKG_VERSION"));
    println!("signing          {}", SIGNING_ALGORITHM);
    println!("cipher           {}", SYMMETRIC_ALGORITHM);
    println!("rustc            {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
