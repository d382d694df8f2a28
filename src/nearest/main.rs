//! Nearest organization finder.
//!
//! Ranks the augmented dataset by distance from a point given either as
//! coordinates or as an address to geocode.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ngo_finder::config::Config;
use ngo_finder::geocoder::NominatimGeocoder;
use ngo_finder::pipeline::{load_and_rank, report_lines, resolve_address, QuerySource};
use ngo_finder::ranking::DEFAULT_LIMIT;
use ngo_finder::telemetry;

#[derive(Parser, Debug)]
#[command(name = "nearest")]
#[command(about = "Find the nearest NGOs to a point")]
struct Args {
    /// Your latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Your longitude
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Your address (takes precedence over --lat/--lon, will be geocoded)
    #[arg(long)]
    address: Option<String>,

    /// Augmented dataset to search
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Number of results
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Printed when neither an address nor a full coordinate pair is given
const USAGE: &str = "Please provide either --lat and --lon or --address.";

impl Args {
    fn query_source(&self) -> Option<QuerySource> {
        QuerySource::from_inputs(self.lat, self.lon, self.address.as_deref())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    telemetry::init("warn")?;

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref())?;

    let Some(source) = args.query_source() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let point = match &source {
        QuerySource::Coordinates(point) => *point,
        QuerySource::Address(address) => {
            let geocoder = NominatimGeocoder::new(config.geocoder.to_nominatim())?;
            resolve_address(&geocoder, address).await?
        }
    };
    info!("Query point: {}", point);

    let dataset = args.dataset.unwrap_or(config.dataset.output);
    let results = load_and_rank(&dataset, point, args.limit)
        .with_context(|| format!("Failed to rank {}", dataset.display()))?;

    for line in report_lines(&results, args.limit) {
        println!("{}", line);
    }

    Ok(())
}
