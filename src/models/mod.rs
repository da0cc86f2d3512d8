// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, CityMatch, CityRecord, DistanceModel, SearchQuery, SearchResult, Selection};
pub use requests::{CitiesQuery, ExclusionsRequest, SearchRequest};
pub use responses::{
    CatalogStatsResponse, CitiesResponse, ErrorResponse, HealthResponse, SearchResponse,
    SelectionResponse, SessionResponse,
};
