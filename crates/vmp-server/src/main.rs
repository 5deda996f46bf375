// crates/vmp-server/src/main.rs
// ============================================================================
// Module: Server Entry Point
// Description: Parses CLI flags, loads configuration, opens the store, and
//              serves the API until SIGINT/SIGTERM.
// Purpose: One binary target with exit codes a process supervisor can act
//          on: 0 clean shutdown, 1 bad configuration, 2 storage failed to
//          open, 3 storage gateway failed to initialize.
// Dependencies: clap, tokio, axum, tower-http, tracing, tracing-subscriber
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use vmp_server::config::LogFormat;
use vmp_server::config::ServerConfig;
use vmp_server::routes;
use vmp_server::state::AppState;

/// Nexus VMP API server.
#[derive(Debug, Parser)]
#[command(name = "vmp-server", version, about)]
struct Cli {
    /// Path to a TOML config file. Falls back to `VMP_CONFIG` then
    /// `vmp-server.toml` in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().json().with_env_filter(filter).init();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ServerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::from(1);
        }
    };

    init_tracing(config.log_format);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(%err, "failed to start async runtime");
            return ExitCode::from(2);
        }
    };

    runtime.block_on(run(config))
}

async fn run(config: ServerConfig) -> ExitCode {
    let bind_addr = config.bind_addr;

    let state = match AppState::build(&config).await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(%err, "failed to open store");
            return ExitCode::from(2);
        }
    };

    let app = routes::build_router().with_state(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, %bind_addr, "failed to bind listener");
            return ExitCode::from(3);
        }
    };

    tracing::info!(%bind_addr, "vmp-server listening");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    };

    if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        tracing::error!(%err, "server error");
        return ExitCode::from(3);
    }

    ExitCode::SUCCESS
}
