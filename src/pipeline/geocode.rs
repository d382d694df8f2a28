use tracing::{info, warn};

use crate::geocoder::Geocoder;
use crate::models::OrganizationRecord;

/// Outcome counts of a geocoding batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub resolved: usize,
    pub unresolved: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.resolved + self.unresolved
    }
}

/// Resolve every record's address, one request at a time.
///
/// A failed lookup leaves that record without coordinates and the batch
/// moves on. Pacing is left to the geocoder. `on_record` runs after each
/// record, resolved or not.
pub async fn geocode_records<G, F>(
    geocoder: &G,
    records: &mut [OrganizationRecord],
    mut on_record: F,
) -> BatchSummary
where
    G: Geocoder,
    F: FnMut(&OrganizationRecord),
{
    let mut summary = BatchSummary::default();

    for record in records.iter_mut() {
        match geocoder.resolve(&record.address).await {
            Ok(point) => {
                info!("Geocoded: {} -> {}", record.address, point);
                record.set_location(Some(point));
                summary.resolved += 1;
            }
            Err(e) => {
                warn!("Error geocoding {}: {}", record.address, e);
                record.set_location(None);
                summary.unresolved += 1;
            }
        }
        on_record(record);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use crate::pipeline::testing::StubGeocoder;

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let geocoder = StubGeocoder::with(&[
            ("Connaught Place", 28.63, 77.21),
            ("Bandra", 19.06, 72.83),
        ]);
        let mut records = vec![
            OrganizationRecord::new("A", "Connaught Place"),
            OrganizationRecord::new("B", "error"),
            OrganizationRecord::new("C", "Atlantis"),
            OrganizationRecord::new("D", "Bandra"),
        ];

        let mut seen = Vec::new();
        let summary =
            geocode_records(&geocoder, &mut records, |r| seen.push(r.name.clone())).await;

        assert_eq!(
            summary,
            BatchSummary {
                resolved: 2,
                unresolved: 2
            }
        );
        assert_eq!(summary.total(), 4);
        assert_eq!(seen, vec!["A", "B", "C", "D"]);
        assert_eq!(records[0].location(), Some(GeoPoint::new(28.63, 77.21)));
        assert_eq!(records[1].location(), None);
        assert_eq!(records[2].location(), None);
        assert_eq!(records[3].location(), Some(GeoPoint::new(19.06, 72.83)));
    }

    #[tokio::test]
    async fn test_every_address_is_looked_up_in_order() {
        let geocoder = StubGeocoder::default();
        let mut records = vec![
            OrganizationRecord::new("A", "first"),
            OrganizationRecord::new("B", "second"),
        ];

        geocode_records(&geocoder, &mut records, |_| {}).await;

        assert_eq!(*geocoder.calls.borrow(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_stale_coordinates_are_cleared() {
        let geocoder = StubGeocoder::default();
        let mut records =
            vec![OrganizationRecord::new("A", "moved").with_location(GeoPoint::new(1.0, 1.0))];

        let summary = geocode_records(&geocoder, &mut records, |_| {}).await;

        assert_eq!(summary.unresolved, 1);
        assert_eq!(records[0].location(), None);
    }
}
