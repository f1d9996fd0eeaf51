pub mod catalog;
pub mod table;

use thiserror::Error;

use crate::models::stop::GeoPoint;

pub use catalog::{CatalogProvider, LocationCatalog};
pub use table::StaticDistanceTable;

const EARTH_RADIUS_MILES: f64 = 3_958.8;

pub fn haversine_miles(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_MILES * central_angle
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("distance provider unavailable: {0}")]
    Unavailable(String),
}

/// A resolved leg between two locations.
#[derive(Debug, Clone, PartialEq)]
pub struct LegDistance {
    pub distance_miles: f64,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    /// Average speed for this leg, when the provider knows better than
    /// the configured default.
    pub speed_mph: Option<f64>,
}

/// Resolves the distance and endpoints of a leg.
///
/// Called once per leg before the simulation starts, never from inside it.
pub trait DistanceProvider: Send + Sync {
    fn resolve(&self, from: &str, to: &str) -> Result<LegDistance, ProviderError>;
}
