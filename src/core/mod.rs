// Core algorithm exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod merger;
pub mod pipeline;
pub mod ranking;

pub use distance::{calculate_bounding_box, distance_meters, is_within_bounding_box, is_within_radius, EARTH_RADIUS_METERS};
pub use error::RecommendError;
pub use filters::{dedupe_by_category, has_distinct_categories};
pub use merger::RecommendationMerger;
pub use pipeline::RecommendationPipeline;
pub use ranking::rank_by_distance;
