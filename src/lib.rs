//! POI Recommender - nearby point-of-interest recommendations
//!
//! Blends three signals into one list: globally well rated places, places in
//! categories the caller likes, and places in categories the caller's friends
//! like. Candidates are merged by source priority, reduced to one place per
//! category, then ranked by distance from the caller.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{distance_meters, RecommendError, RecommendationPipeline};
pub use models::{Category, Coordinate, Locale, Poi, Reason, Recommendation, RecommendationQuery, RecommendationType};
pub use services::{CandidateSource, SourceError};
