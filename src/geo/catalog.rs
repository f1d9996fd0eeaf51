use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::geo::{haversine_miles, DistanceProvider, LegDistance, ProviderError};
use crate::models::stop::GeoPoint;

const BUILTIN_LOCATIONS: &[(&str, f64, f64)] = &[
    ("New York, NY", 40.7128, -74.0060),
    ("Chicago, IL", 41.8781, -87.6298),
    ("Los Angeles, CA", 34.0522, -118.2437),
    ("Houston, TX", 29.7604, -95.3698),
    ("Phoenix, AZ", 33.4484, -112.0740),
    ("Philadelphia, PA", 39.9526, -75.1652),
    ("San Antonio, TX", 29.4241, -98.4936),
    ("Dallas, TX", 32.7767, -96.7970),
    ("Denver, CO", 39.7392, -104.9903),
    ("Seattle, WA", 47.6062, -122.3321),
    ("Atlanta, GA", 33.7490, -84.3880),
    ("Miami, FL", 25.7617, -80.1918),
    ("Kansas City, MO", 39.0997, -94.5786),
    ("St. Louis, MO", 38.6270, -90.1994),
    ("Memphis, TN", 35.1495, -90.0490),
    ("Nashville, TN", 36.1627, -86.7816),
    ("Indianapolis, IN", 39.7684, -86.1581),
    ("Columbus, OH", 39.9612, -82.9988),
    ("Salt Lake City, UT", 40.7608, -111.8910),
    ("Las Vegas, NV", 36.1699, -115.1398),
    ("Albuquerque, NM", 35.0844, -106.6504),
    ("Oklahoma City, OK", 35.4676, -97.5164),
    ("Minneapolis, MN", 44.9778, -93.2650),
    ("Portland, OR", 45.5152, -122.6784),
    ("San Francisco, CA", 37.7749, -122.4194),
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read locations file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid locations file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Named coordinates, looked up case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    entries: HashMap<String, GeoPoint>,
}

impl LocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        let mut catalog = Self::new();
        for (name, lat, lng) in BUILTIN_LOCATIONS {
            catalog.insert(name, GeoPoint { lat: *lat, lng: *lng });
            // "Chicago, IL" is also reachable as "Chicago".
            if let Some((city, _state)) = name.split_once(',') {
                catalog.insert(city, GeoPoint { lat: *lat, lng: *lng });
            }
        }
        catalog
    }

    pub fn insert(&mut self, name: &str, point: GeoPoint) {
        self.entries.insert(normalize(name), point);
    }

    /// Merges a JSON object of the form `{"Name": {"lat": .., "lng": ..}}`.
    pub fn load_json_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: HashMap<String, GeoPoint> = serde_json::from_str(&raw)?;
        let count = parsed.len();
        for (name, point) in parsed {
            self.insert(&name, point);
        }
        debug!(path = %path.display(), count, "loaded locations file");
        Ok(count)
    }

    /// Named lookup, falling back to a literal `"lat,lng"` pair.
    pub fn lookup(&self, name: &str) -> Option<GeoPoint> {
        self.entries
            .get(&normalize(name))
            .copied()
            .or_else(|| parse_coordinates(name))
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_coordinates(raw: &str) -> Option<GeoPoint> {
    let (lat, lng) = raw.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    let valid = lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng);
    valid.then_some(GeoPoint { lat, lng })
}

/// Great-circle distance scaled by a road circuity factor.
#[derive(Debug, Clone)]
pub struct CatalogProvider {
    catalog: LocationCatalog,
    road_factor: f64,
}

impl CatalogProvider {
    pub fn new(catalog: LocationCatalog, road_factor: f64) -> Self {
        Self {
            catalog,
            road_factor,
        }
    }

    fn locate(&self, name: &str) -> Result<GeoPoint, ProviderError> {
        self.catalog
            .lookup(name)
            .ok_or_else(|| ProviderError::UnknownLocation(name.to_string()))
    }
}

impl DistanceProvider for CatalogProvider {
    fn resolve(&self, from: &str, to: &str) -> Result<LegDistance, ProviderError> {
        let origin = self.locate(from)?;
        let destination = self.locate(to)?;

        Ok(LegDistance {
            distance_miles: haversine_miles(&origin, &destination) * self.road_factor,
            origin,
            destination,
            speed_mph: None,
        })
    }
}
