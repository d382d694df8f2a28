//! Top-K nearest selection.
//!
//! Scores every located record against the query point and keeps the `k`
//! closest in a bounded max-heap, so the dataset is never fully sorted.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use crate::models::{GeoPoint, OrganizationRecord, RankedResult};

/// Number of results returned when no limit is given
pub const DEFAULT_LIMIT: usize = 5;

/// Heap entry ordered by (distance, dataset position)
struct Candidate {
    distance_km: f64,
    position: usize,
}

impl Candidate {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.distance_km
            .total_cmp(&other.distance_km)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_cmp(other)
    }
}

/// Select the `k` records closest to `query`, ascending by distance.
///
/// Records without coordinates are skipped before scoring. Equal distances
/// keep dataset order. Fewer than `k` located records yields all of them.
pub fn nearest(query: GeoPoint, records: &[OrganizationRecord], k: usize) -> Vec<RankedResult> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
    let mut located = 0usize;

    for (position, record) in records.iter().enumerate() {
        let Some(point) = record.location() else {
            continue;
        };
        located += 1;

        let distance_km = query.distance_km(&point);
        if distance_km.is_nan() {
            warn!("Skipping '{}': distance is not a number", record.name);
            continue;
        }

        let candidate = Candidate { distance_km, position };

        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(worst) = heap.peek() {
            if candidate < *worst {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    debug!(
        "Ranked {} located records out of {} (k = {})",
        located,
        records.len(),
        k
    );

    heap.into_sorted_vec()
        .into_iter()
        .map(|c| RankedResult {
            record: records[c.position].clone(),
            distance_km: c.distance_km,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(name: &str, lat: f64, lon: f64) -> OrganizationRecord {
        OrganizationRecord::new(name, format!("{} street", name))
            .with_location(GeoPoint::new(lat, lon))
    }

    fn names(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.record.name.as_str()).collect()
    }

    #[test]
    fn test_three_records_scenario() {
        let records = vec![
            located("C", 0.0, 90.0),
            located("A", 0.0, 0.0),
            located("B", 0.0, 1.0),
        ];

        let results = nearest(GeoPoint::new(0.0, 0.0), &records, DEFAULT_LIMIT);
        assert_eq!(names(&results), vec!["A", "B", "C"]);
        assert_eq!(format!("{:.2}", results[0].distance_km), "0.00");
        assert!((results[1].distance_km - 111.19).abs() < 0.01);
        assert!((results[2].distance_km - 10007.54).abs() < 0.01);
    }

    #[test]
    fn test_at_most_k_results_sorted() {
        let records: Vec<_> = (0..20)
            .rev()
            .map(|i| located(&format!("N{}", i), 0.0, i as f64 * 0.5))
            .collect();

        let results = nearest(GeoPoint::new(0.0, 0.0), &records, DEFAULT_LIMIT);
        assert_eq!(results.len(), 5);
        assert_eq!(names(&results), vec!["N0", "N1", "N2", "N3", "N4"]);
        assert!(results
            .windows(2)
            .all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_unlocated_records_filtered() {
        let mut half = OrganizationRecord::new("Half", "lat only");
        half.latitude = Some(0.0);

        let records = vec![
            OrganizationRecord::new("Missing", "nowhere"),
            located("Far", 10.0, 10.0),
            half,
            located("Near", 0.1, 0.1),
        ];

        let results = nearest(GeoPoint::new(0.0, 0.0), &records, DEFAULT_LIMIT);
        assert_eq!(names(&results), vec!["Near", "Far"]);
        assert!(results.iter().all(|r| r.record.location().is_some()));
    }

    #[test]
    fn test_all_unlocated_is_empty() {
        let records = vec![
            OrganizationRecord::new("A", "a"),
            OrganizationRecord::new("B", "b"),
        ];
        assert!(nearest(GeoPoint::new(0.0, 0.0), &records, DEFAULT_LIMIT).is_empty());
        assert!(nearest(GeoPoint::new(0.0, 0.0), &[], DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn test_ties_keep_dataset_order() {
        // All equidistant from the origin
        let records = vec![
            located("East", 0.0, 1.0),
            located("North", 1.0, 0.0),
            located("West", 0.0, -1.0),
            located("South", -1.0, 0.0),
            located("East2", 0.0, 1.0),
            located("West2", 0.0, -1.0),
        ];

        let results = nearest(GeoPoint::new(0.0, 0.0), &records, 3);
        assert_eq!(names(&results), vec!["East", "North", "West"]);
    }

    #[test]
    fn test_ties_across_eviction() {
        let records = vec![
            located("Far", 0.0, 5.0),
            located("Same1", 0.0, 1.0),
            located("Same2", 0.0, 1.0),
            located("Same3", 0.0, 1.0),
        ];

        let results = nearest(GeoPoint::new(0.0, 0.0), &records, 2);
        assert_eq!(names(&results), vec!["Same1", "Same2"]);
    }

    #[test]
    fn test_non_finite_coordinates_never_rank() {
        let records = vec![
            located("Inf", f64::INFINITY, 0.0),
            located("NegNan", -f64::NAN, 0.0),
            located("A", 0.0, 0.0),
            located("B", 0.0, 1.0),
        ];

        let results = nearest(GeoPoint::new(0.0, 0.0), &records, DEFAULT_LIMIT);
        assert_eq!(names(&results), vec!["A", "B"]);
        assert!(results.iter().all(|r| !r.distance_km.is_nan()));
    }

    #[test]
    fn test_zero_limit() {
        let records = vec![located("A", 0.0, 0.0)];
        assert!(nearest(GeoPoint::new(0.0, 0.0), &records, 0).is_empty());
    }
}
