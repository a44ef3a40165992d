use std::collections::HashSet;
use crate::models::Recommendation;

/// Keep at most one recommendation per category
///
/// First-seen wins: a recommendation is dropped whole if **any** of its POI's
/// categories was already claimed by an earlier kept recommendation. A kept
/// recommendation claims all of its categories. Input order is preserved, so
/// callers control priority through the order they merge sources in.
pub fn dedupe_by_category(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let (kept, _seen) = recommendations.into_iter().fold(
        (Vec::new(), HashSet::<String>::new()),
        |(mut kept, mut seen), recommendation| {
            let overlaps = recommendation
                .poi
                .categories
                .iter()
                .any(|category| seen.contains(&category.id));

            if overlaps {
                tracing::trace!(
                    "Dropping {} ({}): category already covered",
                    recommendation.poi.name,
                    recommendation.kind()
                );
            } else {
                seen.extend(recommendation.poi.categories.iter().map(|c| c.id.clone()));
                kept.push(recommendation);
            }

            (kept, seen)
        },
    );

    kept
}

/// Whether no two recommendations share a category id
pub fn has_distinct_categories(recommendations: &[Recommendation]) -> bool {
    let mut seen = HashSet::new();
    recommendations
        .iter()
        .flat_map(|r| r.poi.categories.iter())
        .all(|category| seen.insert(category.id.as_str()))
}
