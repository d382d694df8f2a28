//! Batch geocoding pipeline.
//!
//! Reads the raw organization dataset, resolves every address through
//! Nominatim and writes the augmented dataset with coordinates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use ngo_finder::config::Config;
use ngo_finder::dataset;
use ngo_finder::geocoder::NominatimGeocoder;
use ngo_finder::pipeline::geocode_records;
use ngo_finder::telemetry;

#[derive(Parser, Debug)]
#[command(name = "geocode")]
#[command(about = "Geocode an organization dataset")]
struct Args {
    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw dataset with name and address columns
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write the augmented dataset
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Nominatim base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// User agent sent to the geocoding provider
    #[arg(long)]
    user_agent: Option<String>,

    /// Minimum delay between requests in milliseconds
    #[arg(long)]
    min_delay_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    telemetry::init("info")?;

    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref())?;

    if let Some(input) = args.input {
        config.dataset.input = input;
    }
    if let Some(output) = args.output {
        config.dataset.output = output;
    }
    if let Some(endpoint) = args.endpoint {
        config.geocoder.endpoint = endpoint;
    }
    if let Some(user_agent) = args.user_agent {
        config.geocoder.user_agent = user_agent;
    }
    if let Some(min_delay_ms) = args.min_delay_ms {
        config.geocoder.min_delay_ms = min_delay_ms;
    }

    info!("NGO Finder Geocoding Pipeline");

    let mut records = dataset::read_raw(&config.dataset.input).with_context(|| {
        format!(
            "Failed to load raw dataset {}",
            config.dataset.input.display()
        )
    })?;
    info!("Loaded {} records", records.len());

    let geocoder = NominatimGeocoder::new(config.geocoder.to_nominatim())?;

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let summary = geocode_records(&geocoder, &mut records, |_| pb.inc(1)).await;
    pb.finish_with_message("Geocoding complete");

    if summary.unresolved > 0 {
        warn!(
            "{} of {} addresses could not be resolved",
            summary.unresolved,
            summary.total()
        );
    }

    dataset::write_augmented(&config.dataset.output, &records).with_context(|| {
        format!(
            "Failed to write augmented dataset {}",
            config.dataset.output.display()
        )
    })?;

    info!(
        "Geocoding complete. Saved to {} ({} resolved, {} unresolved)",
        config.dataset.output.display(),
        summary.resolved,
        summary.unresolved
    );

    Ok(())
}
