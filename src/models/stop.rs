use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::hours::Hours;
use crate::models::timeline::DutyStatus;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Linear interpolation; good enough for placing stops along a leg.
    pub fn lerp(&self, to: &GeoPoint, fraction: f64) -> GeoPoint {
        let t = fraction.clamp(0.0, 1.0);
        GeoPoint {
            lat: self.lat + t * (to.lat - self.lat),
            lng: self.lng + t * (to.lng - self.lng),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopType {
    Start,
    Pickup,
    Dropoff,
    Fuel,
    Rest,
    Sleep,
}

impl StopType {
    pub fn as_str(self) -> &'static str {
        match self {
            StopType::Start => "START",
            StopType::Pickup => "PICKUP",
            StopType::Dropoff => "DROPOFF",
            StopType::Fuel => "FUEL",
            StopType::Rest => "REST",
            StopType::Sleep => "SLEEP",
        }
    }

    /// Duty status logged while the truck is parked at this kind of stop.
    pub fn stationary_status(self) -> DutyStatus {
        match self {
            StopType::Start | StopType::Pickup | StopType::Dropoff | StopType::Fuel => {
                DutyStatus::OnDuty
            }
            StopType::Rest | StopType::Sleep => DutyStatus::SleeperBerth,
        }
    }

    /// Whether leaving this stop means getting back behind the wheel.
    pub fn resumes_driving(self) -> bool {
        !matches!(self, StopType::Dropoff)
    }
}

impl fmt::Display for StopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub location: String,
    pub arrival_time: NaiveDateTime,
    pub departure_time: Option<NaiveDateTime>,
    pub stop_type: StopType,
    pub latitude: f64,
    pub longitude: f64,
}

impl Stop {
    pub fn end_time(&self) -> NaiveDateTime {
        self.departure_time.unwrap_or(self.arrival_time)
    }

    pub fn dwell(&self) -> Hours {
        Hours::from_delta(self.end_time() - self.arrival_time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub total_distance_miles: f64,
    pub total_driving_hours: Hours,
    pub stops: Vec<Stop>,
}

impl RouteResult {
    pub fn count(&self, stop_type: StopType) -> usize {
        self.stops
            .iter()
            .filter(|stop| stop.stop_type == stop_type)
            .count()
    }
}
