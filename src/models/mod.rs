// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, Category, Coordinate, CoordinateError, GlobalCandidate, LikedCandidate, Locale, Poi,
    Reason, Recommendation, RecommendationQuery, RecommendationType, SocialCandidate,
};
pub use requests::RecommendRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendationView, RecommendationsResponse};
