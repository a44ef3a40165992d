use crate::core::distance::distance_meters;
use crate::models::{Coordinate, Recommendation};

/// Sort recommendations by ascending distance from `center`
///
/// The sort is stable and compares distances directly: exactly equal
/// distances keep their input order.
pub fn rank_by_distance(center: Coordinate, recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut with_distance: Vec<(f64, Recommendation)> = recommendations
        .into_iter()
        .map(|r| (distance_meters(center, r.poi.location), r))
        .collect();

    with_distance.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    with_distance.into_iter().map(|(_, r)| r).collect()
}
