//! HTTP API for nearest organization queries.
//!
//! Loads the augmented dataset once at startup and answers
//! `/v1/nearest` requests from memory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use ngo_finder::config::Config;
use ngo_finder::dataset;
use ngo_finder::geocoder::NominatimGeocoder;
use ngo_finder::telemetry;
use ngo_finder::OrganizationRecord;

mod api;
use api::{execute_nearest, parse_params, ErrorBody, NearestItem};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Nearest NGO query server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Augmented dataset to serve
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    records: Vec<OrganizationRecord>,
    geocoder: NominatimGeocoder,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init("info")?;

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref())?;

    info!("NGO Finder Query Server");

    let path = args.dataset.unwrap_or(config.dataset.output);
    let records = dataset::read_augmented(&path)
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;
    let located = records.iter().filter(|r| r.location().is_some()).count();
    info!("Serving {} records ({} located)", records.len(), located);

    let geocoder = NominatimGeocoder::new(config.geocoder.to_nominatim())?;

    let state = Arc::new(AppState { records, geocoder });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/nearest", get(nearest_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        records: state.records.len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    records: usize,
}

/// Nearest organizations to a point or address
async fn nearest_handler(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Json<Vec<NearestItem>>, (StatusCode, Json<ErrorBody>)> {
    let result = match parse_params(&uri) {
        Ok(params) => execute_nearest(&state.records, &state.geocoder, params).await,
        Err(e) => Err(e),
    };

    result.map(Json).map_err(|e| {
        if e.status.is_server_error() {
            tracing::error!("Nearest query failed: {}", e.message);
        }
        (e.status, Json(ErrorBody { error: e.message }))
    })
}
