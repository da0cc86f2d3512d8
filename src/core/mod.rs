// Core algorithm exports
pub mod catalog;
pub mod distance;
pub mod search;
pub mod selection;
pub mod session;

pub use catalog::{Catalog, CatalogError, DropReason, LoadReport};
pub use distance::{calculate_bounding_box, distance_km, geodesic_distance, haversine_distance, is_within_bounding_box};
pub use search::{QueryError, RadiusSearch, DEFAULT_RESULT_CAP};
pub use selection::apply_selection;
pub use session::Session;
