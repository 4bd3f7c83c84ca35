//! Telemetry Ingest
//!
//! Equipment telemetry ingestion service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Telemetry Ingest                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐       │
//! │  │  API server  │───▶│   Handlers   │───▶│  Telemetry   │       │
//! │  │  (hyper)     │    │ (validation) │    │    Store     │       │
//! │  └──────────────┘    └──────────────┘    └──────────────┘       │
//! │  ┌──────────────┐    ┌──────────────┐                           │
//! │  │ Health probe │    │  /metrics    │                           │
//! │  └──────────────┘    └──────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use telemetry_ingest::api::{self, router, AppState};
use telemetry_ingest::error::Result;
use telemetry_ingest::health::HealthCheck;
use telemetry_ingest::metrics::TelemetryMetrics;
use telemetry_ingest::store::{StoreConfig, TelemetryStore, MAX_READINGS_PER_EQUIPMENT};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Telemetry Ingest - bounded in-memory equipment telemetry service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API server bind address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen_addr: String,

    /// Health server bind address
    #[arg(long, env = "HEALTH_ADDR", default_value = "0.0.0.0:8081")]
    health_addr: String,

    /// Metrics server bind address
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:9090")]
    metrics_addr: String,

    /// Readings retained per equipment before the oldest is evicted
    #[arg(
        long,
        env = "MAX_READINGS_PER_EQUIPMENT",
        default_value_t = MAX_READINGS_PER_EQUIPMENT
    )]
    max_readings_per_equipment: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting Telemetry Ingest");
    info!("  API address: {}", args.listen_addr);
    info!(
        "  Max readings per equipment: {}",
        args.max_readings_per_equipment
    );

    let store = TelemetryStore::with_config(StoreConfig {
        max_readings_per_equipment: args.max_readings_per_equipment,
    })?;
    let state = AppState::new(
        Arc::new(store),
        Arc::new(TelemetryMetrics::new()?),
        Arc::new(HealthCheck::new()),
    );

    let shutdown = CancellationToken::new();

    // Health and metrics servers
    let health_listener = api::bind(&args.health_addr).await?;
    let health_state = state.clone();
    let health_task = tokio::spawn(api::serve(
        health_listener,
        "Health",
        shutdown.clone(),
        move |req| router::handle_health(health_state.clone(), req),
    ));

    let metrics_listener = api::bind(&args.metrics_addr).await?;
    let metrics_state = state.clone();
    let metrics_task = tokio::spawn(api::serve(
        metrics_listener,
        "Metrics",
        shutdown.clone(),
        move |req| router::handle_metrics(metrics_state.clone(), req),
    ));

    // API server
    let api_listener = api::bind(&args.listen_addr).await?;
    state.health.set_ready(true);

    let token = shutdown.clone();
    let health = Arc::clone(&state.health);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received");
        health.set_ready(false);
        health.set_live(false);
        token.cancel();
    });

    let api_state = state.clone();
    let result = api::serve(api_listener, "API", shutdown.clone(), move |req| {
        router::handle_api(api_state.clone(), req)
    })
    .await;

    shutdown.cancel();
    for (name, task) in [("Health", health_task), ("Metrics", metrics_task)] {
        match task.await {
            Ok(Err(e)) => error!("{} server error: {}", name, e),
            Err(e) => error!("{} server task failed: {}", name, e),
            Ok(Ok(())) => {}
        }
    }

    info!("Telemetry Ingest shutdown complete");
    result
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "hyper_util=warn"] {
        if let Ok(directive) = directive.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
