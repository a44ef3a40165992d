use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use crate::models::{Category, Coordinate, GlobalCandidate, LikedCandidate, SocialCandidate};
use crate::services::source::{CandidateSource, SourceError};

/// Candidate source decorator that caches POI category lookups
///
/// Category sets change rarely and are looked up once per candidate, so they
/// are kept in an in-memory `moka` cache with a TTL. Credentials and
/// candidate queries always go to the wrapped source. Failed lookups are not
/// cached.
pub struct CachedSource<S> {
    inner: S,
    categories: moka::future::Cache<String, HashSet<Category>>,
}

impl<S: CandidateSource> CachedSource<S> {
    pub fn new(inner: S, capacity: u64, ttl_secs: u64) -> Self {
        let categories = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, categories }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CandidateSource> CandidateSource for CachedSource<S> {
    async fn credential_exists(&self, access_token: &str) -> Result<bool, SourceError> {
        self.inner.credential_exists(access_token).await
    }

    async fn fetch_global_candidates(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<GlobalCandidate>, SourceError> {
        self.inner.fetch_global_candidates(center, radius_m).await
    }

    async fn fetch_self_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<LikedCandidate>, SourceError> {
        self.inner.fetch_self_candidates(access_token, center, radius_m).await
    }

    async fn fetch_social_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<SocialCandidate>, SourceError> {
        self.inner.fetch_social_candidates(access_token, center, radius_m).await
    }

    async fn fetch_categories_for_poi(&self, poi_id: &str) -> Result<HashSet<Category>, SourceError> {
        if let Some(categories) = self.categories.get(poi_id).await {
            tracing::trace!("Category cache hit: {}", poi_id);
            return Ok(categories);
        }

        let categories = self.inner.fetch_categories_for_poi(poi_id).await?;
        self.categories.insert(poi_id.to_string(), categories.clone()).await;

        tracing::trace!("Category cache set: {}", poi_id);
        Ok(categories)
    }
}
