use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to search cities around an origin
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1))]
    pub origin: String,
    /// Falls back to the configured default radius when absent
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "radius_km", rename = "radiusKm")]
    pub radius_km: Option<f64>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Full replacement of a session's excluded cities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionsRequest {
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// Query string of the city list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitiesQuery {
    pub prefix: Option<String>,
}
