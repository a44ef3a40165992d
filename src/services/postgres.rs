use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::time::Duration;
use crate::core::distance::EARTH_RADIUS_METERS;
use crate::models::{Category, Coordinate, GlobalCandidate, LikedCandidate, Poi, SocialCandidate};
use crate::services::source::{friend_display_name, keep_first_per_category, CandidateSource, SourceError};

// Law-of-cosines distance in SQL, clamped like `core::distance::distance_meters`.
// $1/$2 are the center latitude/longitude, $3 the earth radius, $4 the search radius.
const GLOBAL_QUERY: &str = r#"
    SELECT p.name, p.latitude, p.longitude, p.foursquare_id, p.rating
    FROM pois p
    WHERE $3 * acos(LEAST(1.0, GREATEST(-1.0,
              sin(radians($1)) * sin(radians(p.latitude))
            + cos(radians($1)) * cos(radians(p.latitude)) * cos(radians(p.longitude - $2))
          ))) <= $4
    ORDER BY p.rating DESC
"#;

// $1 is the access token; $2/$3 center, $4 earth radius, $5 the search radius.
const SELF_QUERY: &str = r#"
    SELECT * FROM (
    SELECT p.name, p.latitude, p.longitude, p.foursquare_id, p.rating, c.name AS category_name,
           $4 * acos(LEAST(1.0, GREATEST(-1.0,
               sin(radians($2)) * sin(radians(p.latitude))
             + cos(radians($2)) * cos(radians(p.latitude)) * cos(radians(p.longitude - $3))
           ))) AS distance
    FROM credentials cr
    JOIN liked_categories lc ON lc.user_id = cr.user_id
    JOIN categories c ON c.foursquare_id = lc.category_foursquare_id
    JOIN poi_categories pc ON pc.category_foursquare_id = c.foursquare_id
    JOIN pois p ON p.foursquare_id = pc.poi_foursquare_id
    WHERE cr.access_token = $1
    ) candidates
    WHERE distance <= $5
    ORDER BY distance ASC
"#;

const SOCIAL_QUERY: &str = r#"
    SELECT * FROM (
    SELECT p.name, p.latitude, p.longitude, p.foursquare_id, p.rating,
           f.name AS friend_name, f.last_name AS friend_last_name, c.name AS category_name,
           $4 * acos(LEAST(1.0, GREATEST(-1.0,
               sin(radians($2)) * sin(radians(p.latitude))
             + cos(radians($2)) * cos(radians(p.latitude)) * cos(radians(p.longitude - $3))
           ))) AS distance
    FROM credentials cr
    JOIN friendships fs ON fs.user_id = cr.user_id
    JOIN app_users f ON f.id = fs.friend_id
    JOIN liked_categories lc ON lc.user_id = f.id
    JOIN categories c ON c.foursquare_id = lc.category_foursquare_id
    JOIN poi_categories pc ON pc.category_foursquare_id = c.foursquare_id
    JOIN pois p ON p.foursquare_id = pc.poi_foursquare_id
    WHERE cr.access_token = $1
    ) candidates
    WHERE distance <= $5
    ORDER BY distance ASC
"#;

const CATEGORIES_QUERY: &str = r#"
    SELECT c.name, c.icon_url, c.foursquare_id
    FROM poi_categories pc
    JOIN categories c ON c.foursquare_id = pc.category_foursquare_id
    WHERE pc.poi_foursquare_id = $1
"#;

/// PostgreSQL-backed candidate source
///
/// Read-only: expects the schema below to be owned and populated elsewhere.
///
/// * `credentials(access_token, user_id)`
/// * `app_users(id, name, last_name)`
/// * `pois(foursquare_id, name, latitude, longitude, rating)`
/// * `categories(foursquare_id, name, icon_url)`
/// * `poi_categories(poi_foursquare_id, category_foursquare_id)`
/// * `liked_categories(user_id, category_foursquare_id)`
/// * `friendships(user_id, friend_id)`
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, SourceError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, SourceError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Map the leading `name, latitude, longitude, foursquare_id, rating` columns
fn poi_from_row(row: &PgRow) -> Result<Poi, SourceError> {
    let name: String = row.try_get("name")?;
    let latitude: f64 = row.try_get("latitude")?;
    let longitude: f64 = row.try_get("longitude")?;
    let external_id: String = row.try_get("foursquare_id")?;
    let rating: Option<f64> = row.try_get("rating")?;

    let location = Coordinate::new(latitude, longitude)
        .map_err(|e| SourceError::MalformedRow(format!("POI {}: {}", external_id, e)))?;

    Ok(Poi::new(external_id, name, location).with_rating(rating.unwrap_or(0.0)))
}

#[async_trait]
impl CandidateSource for PostgresClient {
    async fn credential_exists(&self, access_token: &str) -> Result<bool, SourceError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM credentials WHERE access_token = $1)")
            .bind(access_token)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn fetch_global_candidates(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<GlobalCandidate>, SourceError> {
        let rows = sqlx::query(GLOBAL_QUERY)
            .bind(center.latitude)
            .bind(center.longitude)
            .bind(EARTH_RADIUS_METERS)
            .bind(f64::from(radius_m))
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(|row| {
                let poi = poi_from_row(row)?;
                Ok(GlobalCandidate { rating: poi.rating, poi })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        tracing::debug!("Fetched {} global candidates", candidates.len());
        Ok(candidates)
    }

    async fn fetch_self_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<LikedCandidate>, SourceError> {
        let rows = sqlx::query(SELF_QUERY)
            .bind(access_token)
            .bind(center.latitude)
            .bind(center.longitude)
            .bind(EARTH_RADIUS_METERS)
            .bind(f64::from(radius_m))
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(|row| {
                Ok(LikedCandidate {
                    poi: poi_from_row(row)?,
                    category: row.try_get("category_name")?,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        let candidates = keep_first_per_category(candidates, |c| c.category.as_str());
        tracing::debug!("Fetched {} self candidates", candidates.len());
        Ok(candidates)
    }

    async fn fetch_social_candidates(
        &self,
        access_token: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<SocialCandidate>, SourceError> {
        let rows = sqlx::query(SOCIAL_QUERY)
            .bind(access_token)
            .bind(center.latitude)
            .bind(center.longitude)
            .bind(EARTH_RADIUS_METERS)
            .bind(f64::from(radius_m))
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(|row| {
                let first_name: String = row.try_get("friend_name")?;
                let last_name: Option<String> = row.try_get("friend_last_name")?;
                Ok(SocialCandidate {
                    poi: poi_from_row(row)?,
                    friend_name: friend_display_name(&first_name, last_name.as_deref()),
                    category: row.try_get("category_name")?,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        let candidates = keep_first_per_category(candidates, |c| c.category.as_str());
        tracing::debug!("Fetched {} social candidates", candidates.len());
        Ok(candidates)
    }

    async fn fetch_categories_for_poi(&self, poi_id: &str) -> Result<HashSet<Category>, SourceError> {
        let rows = sqlx::query(CATEGORIES_QUERY)
            .bind(poi_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(Category {
                    name: row.try_get("name")?,
                    icon_url: row.try_get::<Option<String>, _>("icon_url")?.unwrap_or_default(),
                    id: row.try_get("foursquare_id")?,
                })
            })
            .collect()
    }
}
