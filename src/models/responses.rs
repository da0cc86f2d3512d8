use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::LoadReport;
use crate::models::domain::{CityMatch, CityRecord, SearchResult, Selection};

/// Response for the search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none", default)]
    pub session_id: Option<Uuid>,
    pub origin: CityRecord,
    #[serde(rename = "radiusKm")]
    pub radius_km: f64,
    pub matches: Vec<CityMatch>,
    pub count: usize,
}

impl SearchResponse {
    pub fn new(session_id: Option<Uuid>, result: SearchResult) -> Self {
        Self {
            session_id,
            count: result.matches.len(),
            origin: result.origin,
            radius_km: result.radius_km,
            matches: result.matches,
        }
    }
}

/// Current selection of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub selected: Vec<String>,
    pub excluded: Vec<String>,
    pub count: usize,
}

impl SelectionResponse {
    pub fn new(session_id: Uuid, selection: Selection, excluded: Vec<String>) -> Self {
        Self {
            session_id,
            count: selection.names.len(),
            selected: selection.names,
            excluded,
        }
    }
}

/// Full session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub result: Option<SearchResult>,
    pub selected: Option<Vec<String>>,
    pub excluded: Vec<String>,
}

/// Distinct city names for the origin picker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitiesResponse {
    pub cities: Vec<String>,
    pub count: usize,
}

/// Catalog load statistics
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatsResponse {
    pub cities: usize,
    #[serde(rename = "distinctNames")]
    pub distinct_names: usize,
    pub dropped: usize,
    pub report: LoadReport,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "catalogSize")]
    pub catalog_size: usize,
    #[serde(rename = "activeSessions")]
    pub active_sessions: u64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code,
        }
    }
}
