use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::dataset::{self, DatasetError};
use crate::geocoder::{GeocodeError, Geocoder};
use crate::models::{GeoPoint, RankedResult};
use crate::ranking::nearest;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("could not geocode address '{address}': {source}")]
    Unresolved {
        address: String,
        #[source]
        source: GeocodeError,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Where the query point comes from
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySource {
    Address(String),
    Coordinates(GeoPoint),
}

impl QuerySource {
    /// Pick the query source from optional inputs.
    ///
    /// A non-blank address wins over coordinates. Coordinates need both
    /// latitude and longitude. Returns `None` when neither is usable.
    pub fn from_inputs(
        lat: Option<f64>,
        lon: Option<f64>,
        address: Option<&str>,
    ) -> Option<Self> {
        if let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) {
            return Some(QuerySource::Address(address.to_string()));
        }
        match (lat, lon) {
            (Some(lat), Some(lon)) => Some(QuerySource::Coordinates(GeoPoint { lat, lon })),
            _ => None,
        }
    }

    /// Turn the source into a point, geocoding an address if needed
    pub async fn resolve<G: Geocoder>(&self, geocoder: &G) -> Result<GeoPoint, QueryError> {
        match self {
            QuerySource::Coordinates(point) => Ok(*point),
            QuerySource::Address(address) => resolve_address(geocoder, address).await,
        }
    }
}

/// Geocode a query address; any failure is fatal for the query
pub async fn resolve_address<G: Geocoder>(
    geocoder: &G,
    address: &str,
) -> Result<GeoPoint, QueryError> {
    let point = geocoder
        .resolve(address)
        .await
        .map_err(|source| QueryError::Unresolved {
            address: address.to_string(),
            source,
        })?;
    info!("Query address '{}' resolved to {}", address, point);
    Ok(point)
}

/// Load the augmented dataset and rank it against `point`
pub fn load_and_rank(
    path: &Path,
    point: GeoPoint,
    limit: usize,
) -> Result<Vec<RankedResult>, QueryError> {
    let records = dataset::read_augmented(path)?;
    Ok(nearest(point, &records, limit))
}

/// Text report: a header line followed by one line per result
pub fn report_lines(results: &[RankedResult], limit: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(format!("Top {} nearest NGOs:", limit));
    lines.extend(results.iter().map(ToString::to_string));
    lines
}
