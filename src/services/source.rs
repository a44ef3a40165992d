use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;
use crate::models::{Category, Coordinate, GlobalCandidate, LikedCandidate, SocialCandidate};

/// Errors raised by candidate sources
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed row: {0}")]
    MalformedRow(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to candidate POIs and the data needed to gate them
///
/// Candidate POIs are returned without categories; callers attach them via
/// [`CandidateSource::fetch_categories_for_poi`]. Implementations apply their
/// own timeout policy and never retry on the caller's behalf.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Whether `access_token` belongs to a known credential
    async fn credential_exists(&self, access_token: &str) -> Result<bool, SourceError>;

    /// POIs within `radius_m` of `center`, best rated first
    async fn fetch_global_candidates(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<GlobalCandidate>, SourceError>;

    /// POIs within `radius_m` in a category the caller likes, with the matching category name
    async fn fetch_self_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<LikedCandidate>, SourceError>;

    /// POIs within `radius_m` in a category a friend of the caller likes
    async fn fetch_social_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<SocialCandidate>, SourceError>;

    /// Full category set of a POI, keyed by its external id
    async fn fetch_categories_for_poi(&self, poi_id: &str) -> Result<HashSet<Category>, SourceError>;
}

/// Keep only the first row for each matched category name, preserving order
///
/// Personalized queries return rows nearest first, so this leaves the nearest
/// place per liked category.
pub fn keep_first_per_category<T, F>(rows: Vec<T>, category_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(category_of(row).to_string()))
        .collect()
}

/// Friend display name: first name, plus last name when present
pub fn friend_display_name(first_name: &str, last_name: Option<&str>) -> String {
    match last_name.map(str::trim) {
        Some(last) if !last.is_empty() => format!("{} {}", first_name, last),
        _ => first_name.to_string(),
    }
}
