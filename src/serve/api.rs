//! Nearest query handling for the HTTP API.

use axum::extract::Query;
use axum::http::{StatusCode, Uri};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ngo_finder::geocoder::Geocoder;
use ngo_finder::pipeline::{QueryError, QuerySource};
use ngo_finder::ranking::{nearest, DEFAULT_LIMIT};
use ngo_finder::{OrganizationRecord, RankedResult};

/// Upper bound on `limit`
const MAX_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct NearestParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub address: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct NearestItem {
    pub name: String,
    pub address: String,
    /// Kilometers, rounded to 2 decimals
    pub distance: f64,
}

impl From<RankedResult> for NearestItem {
    fn from(result: RankedResult) -> Self {
        Self {
            name: result.record.name,
            address: result.record.address,
            distance: (result.distance_km * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure mapped to an HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        let status = match &err {
            QueryError::Unresolved { source, .. } if source.is_not_found() => {
                StatusCode::NOT_FOUND
            }
            QueryError::Unresolved { .. } => StatusCode::BAD_GATEWAY,
            QueryError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

/// Parse the query string, reporting bad values as a JSON-shaped error
pub fn parse_params(uri: &Uri) -> Result<NearestParams, ApiError> {
    Query::<NearestParams>::try_from_uri(uri)
        .map(|Query(params)| params)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))
}

/// Rank the loaded records for one request
pub async fn execute_nearest<G: Geocoder>(
    records: &[OrganizationRecord],
    geocoder: &G,
    params: NearestParams,
) -> Result<Vec<NearestItem>, ApiError> {
    let source = QuerySource::from_inputs(params.lat, params.lon, params.address.as_deref())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Missing lat or lon"))?;

    let point = source.resolve(geocoder).await?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    debug!("Nearest query at {} (limit {})", point, limit);

    Ok(nearest(point, records, limit)
        .into_iter()
        .map(NearestItem::from)
        .collect())
}
