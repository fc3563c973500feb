mod analysis;
mod cli;
mod config;
mod dashboard;
mod errors;
mod intake;
mod models;
mod pipeline;
mod routes;
mod state;
mod storage;
mod upload;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::HttpAnalysisService;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{spawn_sweeper, UploadStore};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = Config::from_env()?;
            init_tracing(&config.rust_log, false);
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze(args) => {
            // Client logs go to stderr so `--json` output stays clean.
            init_tracing(if cli.verbose { "debug" } else { "warn" }, true);
            Ok(cli::run_analyze(args).await?.into())
        }
    }
}

fn init_tracing(level: &str, to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level)));
    let registry = tracing_subscriber::registry().with(filter);
    if to_stderr {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting ResumeMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Upload slots on local disk, reclaimed after UPLOAD_RETENTION_SECS
    let store = UploadStore::open(&config.storage_dir).await?;
    spawn_sweeper(store.clone(), config.sweep_interval, config.upload_retention);
    info!(
        "Upload store at {} (retention {:?})",
        store.root().display(),
        config.upload_retention
    );

    let analysis = HttpAnalysisService::new(
        config.analysis_service_url.clone(),
        config.analysis_timeout,
    )?;
    info!("Analysis service: {}", analysis.endpoint());

    let state = AppState {
        config: config.clone(),
        store,
        analysis: Arc::new(analysis),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
