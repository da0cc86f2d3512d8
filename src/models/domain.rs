use serde::{Deserialize, Serialize};

/// A city of the catalog with its coordinates in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Whether the coordinates fall in the valid latitude/longitude ranges
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Origin and radius of a coverage search
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub origin: CityRecord,
    pub radius_km: f64,
}

/// A catalog city found by a radius search, with its distance to the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMatch {
    #[serde(flatten)]
    pub city: CityRecord,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Ordered result of a radius search, nearest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub origin: CityRecord,
    #[serde(rename = "radiusKm")]
    pub radius_km: f64,
    pub matches: Vec<CityMatch>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// City names in result order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.city.name.as_str())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }
}

/// Reviewer-confirmed subset of a search result, in result order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub names: Vec<String>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Geospatial bounding box
///
/// `min_lon > max_lon` means the box crosses the antimeridian.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// A box covering the whole globe
    pub fn world() -> Self {
        Self {
            min_lat: -90.0,
            max_lat: 90.0,
            min_lon: -180.0,
            max_lon: 180.0,
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }
}

/// Great-circle model used for distances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceModel {
    /// WGS-84 ellipsoid geodesic
    #[default]
    Geodesic,
    /// Sphere of radius 6371 km
    Haversine,
}
