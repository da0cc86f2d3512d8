//! Provider Coverage - nearest cities within a radius for provider onboarding
//!
//! This library loads a static city catalog, finds the cities within a radius
//! of an origin city (nearest first, capped) and lets a reviewer deselect
//! cities to confirm a coverage area. The HTTP layer keeps one explicit
//! session per form user.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{apply_selection, Catalog, CatalogError, QueryError, RadiusSearch, Session};
pub use models::{CityMatch, CityRecord, DistanceModel, SearchResult, Selection};
