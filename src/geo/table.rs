use std::collections::HashMap;

use crate::geo::{DistanceProvider, LegDistance, ProviderError};
use crate::models::stop::GeoPoint;

/// Fixed road distances between named places.
///
/// Legs are symmetric: registering `a -> b` also answers `b -> a`.
#[derive(Debug, Clone, Default)]
pub struct StaticDistanceTable {
    points: HashMap<String, GeoPoint>,
    legs: HashMap<(String, String), (f64, Option<f64>)>,
}

impl StaticDistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, name: &str, point: GeoPoint) -> Self {
        self.points.insert(name.to_string(), point);
        self
    }

    pub fn with_leg(mut self, from: &str, to: &str, miles: f64) -> Self {
        self.legs.insert(key(from, to), (miles, None));
        self
    }

    pub fn with_leg_at_speed(mut self, from: &str, to: &str, miles: f64, mph: f64) -> Self {
        self.legs.insert(key(from, to), (miles, Some(mph)));
        self
    }

    fn point(&self, name: &str) -> Result<GeoPoint, ProviderError> {
        self.points
            .get(name)
            .copied()
            .ok_or_else(|| ProviderError::UnknownLocation(name.to_string()))
    }
}

fn key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl DistanceProvider for StaticDistanceTable {
    fn resolve(&self, from: &str, to: &str) -> Result<LegDistance, ProviderError> {
        let origin = self.point(from)?;
        let destination = self.point(to)?;

        let (distance_miles, speed_mph) = if from == to {
            (0.0, None)
        } else {
            *self.legs.get(&key(from, to)).ok_or_else(|| {
                ProviderError::Unavailable(format!("no distance known between {from} and {to}"))
            })?
        };

        Ok(LegDistance {
            distance_miles,
            origin,
            destination,
            speed_mph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> StaticDistanceTable {
        StaticDistanceTable::new()
            .with_location("A", GeoPoint { lat: 1.0, lng: 2.0 })
            .with_location("B", GeoPoint { lat: 3.0, lng: 4.0 })
            .with_leg("A", "B", 120.0)
    }

    #[test]
    fn legs_are_symmetric() {
        let table = table();
        let forward = table.resolve("A", "B").unwrap();
        let backward = table.resolve("B", "A").unwrap();

        assert_eq!(forward.distance_miles, 120.0);
        assert_eq!(backward.distance_miles, 120.0);
        assert_eq!(backward.origin, GeoPoint { lat: 3.0, lng: 4.0 });
    }

    #[test]
    fn same_place_is_zero_miles() {
        let leg = table().resolve("A", "A").unwrap();
        assert_eq!(leg.distance_miles, 0.0);
    }

    #[test]
    fn missing_leg_is_unavailable() {
        let table = table().with_location("C", GeoPoint { lat: 0.0, lng: 0.0 });
        assert!(matches!(
            table.resolve("A", "C"),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            table.resolve("A", "Z"),
            Err(ProviderError::UnknownLocation(_))
        ));
    }
}
