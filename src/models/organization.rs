//! Organization records as stored in the augmented dataset.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::distance::haversine_km;

/// Geographic point (lat/lon, degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another point in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// One organization row of the augmented dataset.
///
/// `latitude` and `longitude` are absent when the address could not be
/// geocoded. Such records never take part in distance ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Extra input columns carried through unchanged: (header, value)
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

impl OrganizationRecord {
    /// Create a record without coordinates
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude: None,
            longitude: None,
            extra: Vec::new(),
        }
    }

    /// Builder-style helper to attach coordinates
    pub fn with_location(mut self, point: GeoPoint) -> Self {
        self.set_location(Some(point));
        self
    }

    pub fn set_location(&mut self, point: Option<GeoPoint>) {
        self.latitude = point.map(|p| p.lat);
        self.longitude = point.map(|p| p.lon);
    }

    /// Coordinates, only when both latitude and longitude are present
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        }
    }
}

/// A record paired with its distance from the query point
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub record: OrganizationRecord,
    pub distance_km: f64,
}

impl fmt::Display for RankedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2} km) - {}",
            self.record.name, self.distance_km, self.record.address
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_requires_both_coordinates() {
        let mut record = OrganizationRecord::new("Hope Foundation", "Connaught Place");
        assert_eq!(record.location(), None);

        record.latitude = Some(28.63);
        assert_eq!(record.location(), None);

        record.longitude = Some(77.21);
        assert_eq!(record.location(), Some(GeoPoint::new(28.63, 77.21)));
    }

    #[test]
    fn test_set_location_clears() {
        let mut record =
            OrganizationRecord::new("A", "somewhere").with_location(GeoPoint::new(1.0, 2.0));
        record.set_location(None);
        assert!(record.latitude.is_none());
        assert!(record.longitude.is_none());
    }

    #[test]
    fn test_ranked_result_display() {
        let result = RankedResult {
            record: OrganizationRecord::new(
                "Hope Foundation",
                "123, Main Road, Connaught Place, New Delhi - 110001",
            ),
            distance_km: 2.3,
        };
        assert_eq!(
            result.to_string(),
            "Hope Foundation (2.30 km) - 123, Main Road, Connaught Place, New Delhi - 110001"
        );
    }
}
