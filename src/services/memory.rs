use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::core::distance::{calculate_bounding_box, distance_meters, is_within_radius};
use crate::models::{Category, Coordinate, GlobalCandidate, LikedCandidate, Poi, SocialCandidate};
use crate::services::source::{friend_display_name, keep_first_per_category, CandidateSource, SourceError};

#[derive(Debug, Clone)]
struct UserRecord {
    name: String,
    last_name: Option<String>,
}

/// In-process candidate source
///
/// Holds POIs (with categories and ratings), users, credentials, liked
/// categories and friendships registered through the builder methods, and
/// answers the same queries the SQL source does. Used for local runs, tests
/// and benchmarks.
#[derive(Debug, Default)]
pub struct InMemorySource {
    pois: Vec<Poi>,
    credentials: HashMap<String, String>,
    users: HashMap<String, UserRecord>,
    likes: HashMap<String, Vec<String>>,
    friends: HashMap<String, Vec<String>>,
    candidate_fetches: AtomicUsize,
    category_lookups: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poi(mut self, poi: Poi) -> Self {
        self.pois.push(poi);
        self
    }

    pub fn with_user(mut self, user_id: &str, name: &str, last_name: Option<&str>) -> Self {
        self.users.insert(
            user_id.to_string(),
            UserRecord {
                name: name.to_string(),
                last_name: last_name.map(str::to_string),
            },
        );
        self
    }

    pub fn with_credential(mut self, access_token: &str, user_id: &str) -> Self {
        self.credentials.insert(access_token.to_string(), user_id.to_string());
        self
    }

    pub fn with_like(mut self, user_id: &str, category_id: &str) -> Self {
        self.likes
            .entry(user_id.to_string())
            .or_default()
            .push(category_id.to_string());
        self
    }

    /// Register a mutual friendship
    pub fn with_friendship(mut self, user_id: &str, friend_id: &str) -> Self {
        self.friends
            .entry(user_id.to_string())
            .or_default()
            .push(friend_id.to_string());
        self.friends
            .entry(friend_id.to_string())
            .or_default()
            .push(user_id.to_string());
        self
    }

    /// Number of candidate queries (global, self or social) answered so far
    pub fn candidate_fetches(&self) -> usize {
        self.candidate_fetches.load(Ordering::Relaxed)
    }

    /// Number of category lookups answered so far
    pub fn category_lookups(&self) -> usize {
        self.category_lookups.load(Ordering::Relaxed)
    }

    /// POIs within the radius, nearest first
    fn nearest_within(&self, center: Coordinate, radius_m: u32) -> Vec<&Poi> {
        let radius = f64::from(radius_m);
        let bbox = calculate_bounding_box(center, radius);

        let mut within: Vec<(f64, &Poi)> = self
            .pois
            .iter()
            .filter(|poi| is_within_radius(center, poi.location, radius, &bbox))
            .map(|poi| (distance_meters(center, poi.location), poi))
            .collect();
        within.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        within.into_iter().map(|(_, poi)| poi).collect()
    }

    fn user_for(&self, access_token: &str) -> Option<&str> {
        self.credentials.get(access_token).map(String::as_str)
    }

    fn liked_by(&self, user_id: &str) -> &[String] {
        self.likes.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Liked categories of `user_id` that `poi` belongs to, in like order
    fn matched_categories<'a>(&'a self, user_id: &str, poi: &'a Poi) -> impl Iterator<Item = &'a Category> + 'a {
        self.liked_by(user_id)
            .iter()
            .filter_map(move |id| poi.categories.iter().find(|c| &c.id == id))
    }
}

/// Candidate rows carry no categories
fn uncategorized(poi: &Poi) -> Poi {
    Poi {
        categories: HashSet::new(),
        ..poi.clone()
    }
}

#[async_trait]
impl CandidateSource for InMemorySource {
    async fn credential_exists(&self, access_token: &str) -> Result<bool, SourceError> {
        Ok(self.credentials.contains_key(access_token))
    }

    async fn fetch_global_candidates(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<GlobalCandidate>, SourceError> {
        self.candidate_fetches.fetch_add(1, Ordering::Relaxed);

        let mut pois = self.nearest_within(center, radius_m);
        pois.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        Ok(pois
            .into_iter()
            .map(|poi| GlobalCandidate {
                poi: uncategorized(poi),
                rating: poi.rating,
            })
            .collect())
    }

    async fn fetch_self_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<LikedCandidate>, SourceError> {
        self.candidate_fetches.fetch_add(1, Ordering::Relaxed);

        let Some(user_id) = self.user_for(access_token) else {
            return Ok(Vec::new());
        };

        let rows: Vec<LikedCandidate> = self
            .nearest_within(center, radius_m)
            .into_iter()
            .flat_map(|poi| {
                self.matched_categories(user_id, poi).map(move |category| LikedCandidate {
                    poi: uncategorized(poi),
                    category: category.name.clone(),
                })
            })
            .collect();

        Ok(keep_first_per_category(rows, |row| row.category.as_str()))
    }

    async fn fetch_social_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<SocialCandidate>, SourceError> {
        self.candidate_fetches.fetch_add(1, Ordering::Relaxed);

        let Some(user_id) = self.user_for(access_token) else {
            return Ok(Vec::new());
        };
        let friend_ids = self.friends.get(user_id).cloned().unwrap_or_default();

        let mut rows = Vec::new();
        for poi in self.nearest_within(center, radius_m) {
            for friend_id in &friend_ids {
                let Some(friend) = self.users.get(friend_id) else {
                    continue;
                };
                let friend_name = friend_display_name(&friend.name, friend.last_name.as_deref());
                for category in self.matched_categories(friend_id, poi) {
                    rows.push(SocialCandidate {
                        poi: uncategorized(poi),
                        friend_name: friend_name.clone(),
                        category: category.name.clone(),
                    });
                }
            }
        }

        Ok(keep_first_per_category(rows, |row| row.category.as_str()))
    }

    async fn fetch_categories_for_poi(&self, poi_id: &str) -> Result<HashSet<Category>, SourceError> {
        self.category_lookups.fetch_add(1, Ordering::Relaxed);

        Ok(self
            .pois
            .iter()
            .find(|poi| poi.external_id == poi_id)
            .map(|poi| poi.categories.clone())
            .unwrap_or_default())
    }
}
