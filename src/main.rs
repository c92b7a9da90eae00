// Main entry point - Dependency injection, CLI and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::stats_service::StatsService;
use crate::infrastructure::ascii_chart::AsciiChart;
use crate::infrastructure::config::{load_config, AppConfig, DEFAULT_CONFIG_PATH};
use crate::infrastructure::csv_repository::CsvSampleRepository;
use crate::infrastructure::system_clock::SystemClock;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{daily_overview, health_check, stats_report};

#[derive(Parser, Debug)]
#[command(name = "boiler-telemetry", about = "Pellet boiler power log analytics")]
struct Cli {
    /// Configuration file, extension optional
    #[arg(short, long, env = "BOILER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Print the report once and exit
    Stats,
    /// Serve the report over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the printed report stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let stats_service = build_stats_service(&config);

    match cli.command.unwrap_or(Command::Stats) {
        Command::Stats => {
            let analysis = stats_service.stats().await?;
            println!("{}", analysis.outcome);
        }
        Command::Serve => serve(&config, stats_service).await?,
    }

    Ok(())
}

fn build_stats_service(config: &AppConfig) -> StatsService {
    let repository = Arc::new(CsvSampleRepository::new(config.paths.data.clone()));
    tracing::info!("Reading samples from {}", repository.path().display());

    StatsService::new(
        repository,
        Arc::new(AsciiChart::new()),
        Arc::new(SystemClock),
        config.analysis.clone(),
        config.estimations,
    )
}

async fn serve(config: &AppConfig, stats_service: StatsService) -> anyhow::Result<()> {
    let state = Arc::new(AppState { stats_service });

    // Compression is handled in the response builders, not as a layer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/stats", get(stats_report))
        .route("/stats/daily", get(daily_overview))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting boiler-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
