use std::sync::Arc;
use crate::core::{
    error::RecommendError,
    filters::dedupe_by_category,
    merger::RecommendationMerger,
    ranking::rank_by_distance,
};
use crate::models::{Recommendation, RecommendationQuery};
use crate::services::CandidateSource;

/// Recommendation entry point
///
/// # Pipeline Stages
/// 1. Merge candidates (SELF, SOCIAL, GLOBAL)
/// 2. Drop recommendations whose category is already covered
/// 3. Rank by distance from the query center
///
/// Deduplication runs on merge order, before ranking: a closer GLOBAL POI
/// never displaces a personalized one of the same category.
#[derive(Clone)]
pub struct RecommendationPipeline {
    merger: RecommendationMerger,
}

impl RecommendationPipeline {
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self {
            merger: RecommendationMerger::new(source),
        }
    }

    /// Produce the ordered, category-distinct recommendations for a query
    ///
    /// `query.locale` is not consulted here.
    pub async fn recommend(&self, query: &RecommendationQuery) -> Result<Vec<Recommendation>, RecommendError> {
        let merged = self.merger.merge(query).await?;
        let merged_count = merged.len();

        let deduped = dedupe_by_category(merged);
        tracing::debug!("Deduplicated {} candidates down to {}", merged_count, deduped.len());

        let ranked = rank_by_distance(query.center, deduped);

        tracing::debug!(
            "Ranked {} places within {}m of {}",
            ranked.len(),
            query.radius_m,
            query.center
        );

        Ok(ranked)
    }
}
