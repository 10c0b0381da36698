//! bookden-api - book catalog service
//!
//! Serves the catalog HTTP API over two stores (relational catalog +
//! document store) and runs the background refresh-token sweeper.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use bookden_api::{build_router, AppState};
use bookden_common::config::Config;
use bookden_common::db::init::init_catalog_db;
use bookden_common::docstore::init::init_document_db;

#[derive(Debug, Parser)]
#[command(name = "bookden-api", about = "Book catalog service")]
struct Args {
    /// Folder holding the database files
    #[arg(long)]
    data_dir: Option<String>,

    /// HTTP bind address, e.g. 127.0.0.1:5760
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting bookden-api v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::resolve(args.data_dir.as_deref(), args.bind.as_deref())?;
    info!("Data folder: {}", config.data_dir.display());

    let catalog = init_catalog_db(&config.catalog_db_path()).await?;
    let docs = init_document_db(&config.document_db_path()).await?;

    let state = AppState::new(catalog, docs, &config);

    // Background sweep of expired refresh tokens; cancelled on shutdown
    let cancel = CancellationToken::new();
    let sweeper = tokio::spawn(state.sessions.clone().run_sweeper(
        std::time::Duration::from_secs(config.sweep_interval_secs),
        cancel.clone(),
    ));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("bookden-api listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    sweeper.await?;
    info!("bookden-api stopped");

    Ok(())
}

/// Resolve on ctrl-c and propagate cancellation to background tasks
async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    cancel.cancel();
}
