use crate::core::{
    catalog::Catalog,
    distance::{calculate_bounding_box, distance_km, is_within_bounding_box},
};
use crate::models::{CityMatch, CityRecord, DistanceModel, SearchQuery, SearchResult};
use thiserror::Error;

/// Result cap used when the caller does not pick one
pub const DEFAULT_RESULT_CAP: usize = 100;

/// Errors that make a search query invalid
///
/// A valid query with no matches is an empty [`SearchResult`], never an error.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Origin city not found in catalog: {0}")]
    OriginNotFound(String),

    #[error("Radius must be a finite, non-negative number of kilometers, got {0}")]
    InvalidRadius(f64),
}

/// Nearest-city-in-radius resolver
///
/// # Pipeline
/// 1. Bounding box pre-filter around the origin
/// 2. Exact distance under the configured model, keep `<= radius`
/// 3. Stable sort by ascending distance (ties keep catalog order)
/// 4. Truncate to the cap, silently
#[derive(Debug, Clone, Copy, Default)]
pub struct RadiusSearch {
    model: DistanceModel,
}

impl RadiusSearch {
    pub fn new(model: DistanceModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> DistanceModel {
        self.model
    }

    /// Find catalog cities within `radius_km` of `origin`
    ///
    /// # Arguments
    /// * `catalog` - The city catalog, never mutated
    /// * `origin` - Point distances are measured from
    /// * `radius_km` - Inclusive radius in kilometers
    /// * `cap` - Maximum number of cities returned
    pub fn search(
        &self,
        catalog: &Catalog,
        origin: &CityRecord,
        radius_km: f64,
        cap: usize,
    ) -> Result<SearchResult, QueryError> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(QueryError::InvalidRadius(radius_km));
        }

        let bbox = calculate_bounding_box(origin.latitude, origin.longitude, radius_km);

        let mut matches: Vec<CityMatch> = catalog
            .cities()
            .iter()
            .filter(|city| is_within_bounding_box(city.latitude, city.longitude, &bbox))
            .filter_map(|city| {
                let distance = distance_km(self.model, origin, city);
                (distance <= radius_km).then(|| CityMatch {
                    city: city.clone(),
                    distance_km: distance,
                })
            })
            .collect();

        // sort_by is stable, equal distances keep catalog order
        matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        matches.truncate(cap);

        tracing::debug!(
            "Radius search from {} ({} km): {} cities",
            origin.name,
            radius_km,
            matches.len()
        );

        Ok(SearchResult {
            origin: origin.clone(),
            radius_km,
            matches,
        })
    }

    /// Run a prepared query
    pub fn run(
        &self,
        catalog: &Catalog,
        query: &SearchQuery,
        cap: usize,
    ) -> Result<SearchResult, QueryError> {
        self.search(catalog, &query.origin, query.radius_km, cap)
    }

    /// Resolve the origin by name, then search
    pub fn search_by_name(
        &self,
        catalog: &Catalog,
        origin_name: &str,
        radius_km: f64,
        cap: usize,
    ) -> Result<SearchResult, QueryError> {
        let origin = catalog
            .find(origin_name)
            .ok_or_else(|| QueryError::OriginNotFound(origin_name.to_string()))?;

        self.search(catalog, origin, radius_km, cap)
    }
}
