use serde::{Deserialize, Serialize};
use crate::models::domain::{Poi, RecommendationType};

/// A ranked recommendation as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationView {
    pub poi: Poi,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend: Option<String>,
    pub reason: String,
    #[serde(rename = "distanceMeters")]
    pub distance_meters: f64,
}

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendationView>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
