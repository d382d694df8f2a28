//! Address to coordinate resolution.
//!
//! The [`Geocoder`] trait is the seam the pipelines depend on. The
//! production implementation talks to a Nominatim server and paces its
//! own requests with a [`RateLimiter`].

mod nominatim;
mod rate_limit;

pub use nominatim::{NominatimConfig, NominatimGeocoder, PUBLIC_NOMINATIM_URL};
pub use rate_limit::RateLimiter;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::GeoPoint;

/// Why an address could not be resolved
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no match for address: {0}")]
    NotFound(String),

    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding provider returned status {0}")]
    Status(StatusCode),

    #[error("invalid geocoding response: {0}")]
    InvalidResponse(String),
}

impl GeocodeError {
    /// True when the provider answered but had no match
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeocodeError::NotFound(_))
    }
}

/// Resolves a free-form address to a single coordinate
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    async fn resolve(&self, address: &str) -> Result<GeoPoint, GeocodeError>;
}
