use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    /// `lat,lon` in degrees
    #[validate(length(min = 3))]
    pub location: String,
    /// Search radius in meters
    #[validate(range(min = 1))]
    pub radius: Option<u32>,
    #[validate(length(min = 1))]
    #[serde(rename = "access-token", alias = "accessToken")]
    pub access_token: Option<String>,
}
