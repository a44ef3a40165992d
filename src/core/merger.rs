use std::sync::Arc;
use crate::core::error::RecommendError;
use crate::models::{Coordinate, Poi, Reason, Recommendation, RecommendationQuery};
use crate::services::CandidateSource;

/// Gathers candidates from the rating, personal and social sources
///
/// Output order is SELF, then SOCIAL, then GLOBAL, each in the order the
/// source returned them. Downstream deduplication is first-seen-wins, so this
/// order is what gives personalized results priority over global ones.
#[derive(Clone)]
pub struct RecommendationMerger {
    source: Arc<dyn CandidateSource>,
}

impl RecommendationMerger {
    pub fn new(source: Arc<dyn CandidateSource>) -> Self {
        Self { source }
    }

    /// Fetch and concatenate candidates for a query, categories attached
    ///
    /// # Errors
    /// * `RecommendError::InvalidUser` when a token is given but unknown; no
    ///   candidate fetch is issued in that case
    /// * `RecommendError::Source` for any source failure
    pub async fn merge(&self, query: &RecommendationQuery) -> Result<Vec<Recommendation>, RecommendError> {
        let center = query.center;
        let radius_m = query.radius_m;

        let Some(token) = query.access_token.as_deref() else {
            tracing::debug!("Only global recommendations...");
            return self.fetch_global(center, radius_m).await;
        };

        if !self.source.credential_exists(token).await? {
            tracing::warn!("Unknown access token attempting to fetch recommendations");
            return Err(RecommendError::InvalidUser);
        }

        tracing::debug!("Adding personalized recommendations...");

        // Fetched concurrently, concatenated in fixed priority order
        let (liked, social, global) = tokio::try_join!(
            self.fetch_liked(token, center, radius_m),
            self.fetch_social(token, center, radius_m),
            self.fetch_global(center, radius_m),
        )?;

        tracing::debug!(
            "Merged candidates: {} self, {} social, {} global",
            liked.len(),
            social.len(),
            global.len()
        );

        let mut merged = Vec::with_capacity(liked.len() + social.len() + global.len());
        merged.extend(liked);
        merged.extend(social);
        merged.extend(global);
        Ok(merged)
    }

    async fn fetch_liked(
        &self,
        token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let rows = self.source.fetch_self_candidates(token, center, radius_m).await?;

        let mut recommendations = Vec::with_capacity(rows.len());
        for row in rows {
            recommendations.push(Recommendation {
                poi: self.with_categories(row.poi).await?,
                reason: Reason::SelfLiked { category: row.category },
            });
        }
        Ok(recommendations)
    }

    async fn fetch_social(
        &self,
        token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        let rows = self.source.fetch_social_candidates(token, center, radius_m).await?;

        let mut recommendations = Vec::with_capacity(rows.len());
        for row in rows {
            recommendations.push(Recommendation {
                poi: self.with_categories(row.poi).await?,
                reason: Reason::Social {
                    friend: row.friend_name,
                    category: row.category,
                },
            });
        }
        Ok(recommendations)
    }

    async fn fetch_global(&self, center: Coordinate, radius_m: u32) -> Result<Vec<Recommendation>, RecommendError> {
        let rows = self.source.fetch_global_candidates(center, radius_m).await?;

        let mut recommendations = Vec::with_capacity(rows.len());
        for row in rows {
            let poi = row.poi.with_rating(row.rating);
            recommendations.push(Recommendation {
                poi: self.with_categories(poi).await?,
                reason: Reason::Global,
            });
        }
        Ok(recommendations)
    }

    async fn with_categories(&self, mut poi: Poi) -> Result<Poi, RecommendError> {
        poi.categories = self.source.fetch_categories_for_poi(&poi.external_id).await?;
        Ok(poi)
    }
}
