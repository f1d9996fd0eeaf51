use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{FixedOffset, NaiveDateTime, SubsecRound, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::logbook;
use crate::engine::plan_trip;
use crate::error::AppError;
use crate::models::log::{LogContext, LogRecord};
use crate::models::trip::{Trip, TripPlanned, TripRequest};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trips", post(create_trip).get(list_trips))
        .route("/trips/:id", get(get_trip).delete(delete_trip))
        .route("/trips/:id/logs", get(get_trip_logs))
}

#[derive(Deserialize)]
pub struct CreateTripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub current_cycle_hours: f64,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub truck_number: Option<String>,
    #[serde(default)]
    pub carrier_name: Option<String>,
}

fn now_at_home(offset: FixedOffset) -> NaiveDateTime {
    Utc::now().with_timezone(&offset).naive_local()
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

async fn create_trip(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let locations = [
        ("current_location", &payload.current_location),
        ("pickup_location", &payload.pickup_location),
        ("dropoff_location", &payload.dropoff_location),
    ];
    for (field, value) in locations {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} cannot be empty")));
        }
    }

    let request = TripRequest {
        current_location: payload.current_location.trim().to_string(),
        pickup_location: payload.pickup_location.trim().to_string(),
        dropoff_location: payload.dropoff_location.trim().to_string(),
        cycle_hours_used: payload.current_cycle_hours,
    };
    let start_time = payload
        .start_time
        .unwrap_or_else(|| now_at_home(state.home_offset))
        .trunc_subsecs(0);
    let defaults = &state.default_log_context;
    let context = LogContext {
        driver_name: or_default(payload.driver_name, &defaults.driver_name),
        truck_number: or_default(payload.truck_number, &defaults.truck_number),
        carrier_name: or_default(payload.carrier_name, &defaults.carrier_name),
    };

    let started = Instant::now();
    let outcome = plan_trip(&request, state.provider.as_ref(), &state.rules, start_time);
    let elapsed = started.elapsed().as_secs_f64();
    let label = if outcome.is_ok() { "success" } else { "error" };
    state
        .metrics
        .planning_latency_seconds
        .with_label_values(&[label])
        .observe(elapsed);
    state
        .metrics
        .trips_planned_total
        .with_label_values(&[label])
        .inc();

    let plan = outcome.inspect_err(|err| {
        warn!(error = %err, pickup = %request.pickup_location, "trip planning failed");
    })?;

    for stop in &plan.route.stops {
        state
            .metrics
            .stops_planned_total
            .with_label_values(&[stop.stop_type.as_str()])
            .inc();
    }

    let trip = Trip {
        id: Uuid::new_v4(),
        current_location: request.current_location,
        pickup_location: request.pickup_location,
        dropoff_location: request.dropoff_location,
        current_cycle_hours: request.cycle_hours_used,
        start_time,
        created_at: Utc::now(),
        total_distance_miles: plan.route.total_distance_miles,
        total_driving_hours: plan.route.total_driving_hours,
        eld_logs: plan
            .timelines
            .iter()
            .map(|timeline| logbook::assemble(timeline, &context))
            .collect(),
        stops: plan.route.stops,
    };

    state.trips.insert(trip.id, trip.clone());
    state.metrics.trips_stored.set(state.trips.len() as i64);
    let _ = state.trip_events_tx.send(TripPlanned::from(&trip));

    info!(
        trip_id = %trip.id,
        distance_miles = trip.total_distance_miles,
        driving_hours = %trip.total_driving_hours,
        stops = trip.stops.len(),
        log_days = trip.eld_logs.len(),
        "trip planned"
    );

    Ok((StatusCode::CREATED, Json(trip)))
}

async fn list_trips(State(state): State<Arc<AppState>>) -> Json<Vec<Trip>> {
    let mut trips: Vec<Trip> = state
        .trips
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    trips.sort_by_key(|trip| trip.created_at);

    Json(trips)
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("trip {} not found", id)))?;

    Ok(Json(trip.value().clone()))
}

async fn get_trip_logs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LogRecord>>, AppError> {
    let trip = state
        .trips
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("trip {} not found", id)))?;

    Ok(Json(trip.eld_logs.clone()))
}

async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .trips
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("trip {} not found", id)))?;
    state.metrics.trips_stored.set(state.trips.len() as i64);

    Ok(StatusCode::NO_CONTENT)
}
