//! Nominatim forward geocoding client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{GeocodeError, Geocoder, RateLimiter};
use crate::models::GeoPoint;

pub const PUBLIC_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

const PUBLIC_NOMINATIM_HOST: &str = "nominatim.openstreetmap.org";

/// The public server allows at most one request per second
const PUBLIC_MIN_DELAY: Duration = Duration::from_secs(1);

/// Connection settings for a Nominatim server
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub min_delay: Duration,
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            endpoint: PUBLIC_NOMINATIM_URL.to_string(),
            user_agent: "ngo_locator".to_string(),
            min_delay: PUBLIC_MIN_DELAY,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Rate-limited Nominatim client
pub struct NominatimGeocoder {
    client: Client,
    search_url: Url,
    limiter: RateLimiter,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self> {
        let mut base = Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid geocoder endpoint: {}", config.endpoint))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base.join("search")?;

        let min_delay = if base.host_str() == Some(PUBLIC_NOMINATIM_HOST) {
            config.min_delay.max(PUBLIC_MIN_DELAY)
        } else {
            config.min_delay
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        info!("Geocoding via {} (min delay {:?})", search_url, min_delay);

        Ok(Self {
            client,
            search_url,
            limiter: RateLimiter::new(min_delay),
        })
    }

    /// Minimum spacing between requests actually in effect
    pub fn min_delay(&self) -> Duration {
        self.limiter.min_delay()
    }
}

impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        self.limiter.acquire().await;

        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "jsonv2")
            .append_pair("limit", "1");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

        let lat = parse_coordinate(&hit.lat)?;
        let lon = parse_coordinate(&hit.lon)?;

        debug!(
            "Resolved '{}' to {}, {} ({})",
            address,
            lat,
            lon,
            hit.display_name.as_deref().unwrap_or("-")
        );

        Ok(GeoPoint { lat, lon })
    }
}

fn parse_coordinate(value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse()
        .map_err(|_| GeocodeError::InvalidResponse(format!("bad coordinate '{}'", value)))
}
