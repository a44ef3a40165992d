use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when building a coordinate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),

    #[error("Invalid location format, expected 'lat,lon': {0}")]
    InvalidFormat(String),
}

/// Geographic position in degrees
///
/// Deserialization goes through [`Coordinate::new`], so out-of-range input is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the WGS84 ranges (and NaN)
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    /// Parse the `lat,lon` form used in query strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordinateError::InvalidFormat(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
        Coordinate::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// POI category. Equality and hashing use `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "iconUrl")]
    pub icon_url: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon_url: icon_url.into(),
        }
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    #[serde(rename = "externalId")]
    pub external_id: String,
    pub name: String,
    pub location: Coordinate,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub categories: HashSet<Category>,
}

impl Poi {
    /// A POI as the candidate queries return it: no categories attached yet
    pub fn new(external_id: impl Into<String>, name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            external_id: external_id.into(),
            name: name.into(),
            location,
            rating: 0.0,
            categories: HashSet::new(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn has_category(&self, category_id: &str) -> bool {
        self.categories.iter().any(|c| c.id == category_id)
    }
}

/// Which signal produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationType {
    #[serde(rename = "GLOBAL")]
    Global,
    #[serde(rename = "SELF")]
    SelfLiked,
    #[serde(rename = "SOCIAL")]
    Social,
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationType::Global => "GLOBAL",
            RecommendationType::SelfLiked => "SELF",
            RecommendationType::Social => "SOCIAL",
        };
        f.write_str(s)
    }
}

/// Reason parameters, one shape per recommendation type.
///
/// `category` is always the category name that caused the match, not an
/// arbitrary member of the POI's category set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Reason {
    #[serde(rename = "GLOBAL")]
    Global,
    #[serde(rename = "SELF")]
    SelfLiked { category: String },
    #[serde(rename = "SOCIAL")]
    Social { friend: String, category: String },
}

impl Reason {
    pub fn kind(&self) -> RecommendationType {
        match self {
            Reason::Global => RecommendationType::Global,
            Reason::SelfLiked { .. } => RecommendationType::SelfLiked,
            Reason::Social { .. } => RecommendationType::Social,
        }
    }
}

/// A POI together with the signal that selected it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub poi: Poi,
    #[serde(flatten)]
    pub reason: Reason,
}

impl Recommendation {
    pub fn kind(&self) -> RecommendationType {
        self.reason.kind()
    }
}

/// Language used for reason text. Never consulted by selection or ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Resolve a locale from an `Accept-Language` style value, falling back to English
    pub fn from_language_tag(tag: &str) -> Self {
        let primary = tag
            .split(',')
            .next()
            .and_then(|first| first.split(';').next())
            .and_then(|lang| lang.trim().split(['-', '_']).next())
            .unwrap_or("")
            .to_ascii_lowercase();

        match primary.as_str() {
            "es" => Locale::Es,
            _ => Locale::En,
        }
    }
}

/// Per-request recommendation query
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    pub center: Coordinate,
    pub radius_m: u32,
    pub access_token: Option<String>,
    pub locale: Locale,
}

impl RecommendationQuery {
    pub fn new(center: Coordinate, radius_m: u32, access_token: Option<String>, locale: Locale) -> Self {
        Self {
            center,
            radius_m,
            access_token,
            locale,
        }
    }

    /// Query without caller credentials; only GLOBAL results are possible
    pub fn anonymous(center: Coordinate, radius_m: u32) -> Self {
        Self::new(center, radius_m, None, Locale::default())
    }
}

/// Row from the rating-ordered candidate query
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalCandidate {
    pub poi: Poi,
    pub rating: f64,
}

/// Row from the caller's liked-categories query
#[derive(Debug, Clone, PartialEq)]
pub struct LikedCandidate {
    pub poi: Poi,
    pub category: String,
}

/// Row from the friends' liked-categories query
#[derive(Debug, Clone, PartialEq)]
pub struct SocialCandidate {
    pub poi: Poi,
    pub friend_name: String,
    pub category: String,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
