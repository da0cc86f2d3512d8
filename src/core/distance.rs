use crate::models::{BoundingBox, CityRecord, DistanceModel};
use geo::{GeodesicDistance, Point};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Relative slack applied to bounding boxes so ellipsoid distances within the
/// radius are never cut by the spherical box
const BOUNDING_BOX_MARGIN: f64 = 1.01;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate the geodesic distance on the WGS-84 ellipsoid in kilometers
#[inline]
pub fn geodesic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    a.geodesic_distance(&b) / 1000.0
}

/// Distance in kilometers between two cities under the given model
#[inline]
pub fn distance_km(model: DistanceModel, a: &CityRecord, b: &CityRecord) -> f64 {
    if a.latitude == b.latitude && a.longitude == b.longitude {
        return 0.0;
    }

    // Canonical argument order keeps the result bit-for-bit symmetric
    let (a, b) = if (a.latitude, a.longitude) <= (b.latitude, b.longitude) {
        (a, b)
    } else {
        (b, a)
    };

    match model {
        DistanceModel::Geodesic => {
            geodesic_distance(a.latitude, a.longitude, b.latitude, b.longitude)
        }
        DistanceModel::Haversine => {
            haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
        }
    }
}

/// Calculate a bounding box around a center point
///
/// The box is conservative: every point within `radius_km` of the center lies
/// inside it, for both distance models. The longitude span uses the exact
/// spherical tangent formula, and the box opens to the full longitude range
/// when the circle reaches a pole.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let angular = radius_km * BOUNDING_BOX_MARGIN / EARTH_RADIUS_KM;
    if !angular.is_finite() || angular >= std::f64::consts::PI {
        return BoundingBox::world();
    }

    let lat_delta = angular.to_degrees();
    let min_lat = lat - lat_delta;
    let max_lat = lat + lat_delta;

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return BoundingBox {
            min_lat: min_lat.max(-90.0),
            max_lat: max_lat.min(90.0),
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    // Widest longitude offset reached by a spherical cap of this radius
    let ratio = angular.sin() / lat.to_radians().cos();
    if ratio >= 1.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }
    let lon_delta = ratio.asin().to_degrees();

    let mut min_lon = lon - lon_delta;
    let mut max_lon = lon + lon_delta;
    if min_lon < -180.0 {
        min_lon += 360.0;
    }
    if max_lon > 180.0 {
        max_lon -= 360.0;
    }

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    if lat < bbox.min_lat || lat > bbox.max_lat {
        return false;
    }

    if bbox.crosses_antimeridian() {
        lon >= bbox.min_lon || lon <= bbox.max_lon
    } else {
        lon >= bbox.min_lon && lon <= bbox.max_lon
    }
}
