use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::hours::Hours;
use crate::models::log::LogRecord;
use crate::models::stop::Stop;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub cycle_hours_used: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub current_cycle_hours: f64,
    pub start_time: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    pub total_distance_miles: f64,
    pub total_driving_hours: Hours,
    pub stops: Vec<Stop>,
    pub eld_logs: Vec<LogRecord>,
}

/// Broadcast to websocket subscribers whenever a trip has been planned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlanned {
    pub trip_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total_distance_miles: f64,
    pub total_driving_hours: Hours,
    pub stop_count: usize,
    pub log_days: usize,
}

impl From<&Trip> for TripPlanned {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id,
            created_at: trip.created_at,
            total_distance_miles: trip.total_distance_miles,
            total_driving_hours: trip.total_driving_hours,
            stop_count: trip.stops.len(),
            log_days: trip.eld_logs.len(),
        }
    }
}
