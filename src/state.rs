use std::sync::Arc;

use chrono::FixedOffset;
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::engine::rules::HosRules;
use crate::geo::DistanceProvider;
use crate::models::log::LogContext;
use crate::models::trip::{Trip, TripPlanned};
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub trips: DashMap<Uuid, Trip>,
    pub provider: Arc<dyn DistanceProvider>,
    pub rules: HosRules,
    pub default_log_context: LogContext,
    pub home_offset: FixedOffset,
    pub trip_events_tx: broadcast::Sender<TripPlanned>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn DistanceProvider>,
        rules: HosRules,
        default_log_context: LogContext,
        home_offset: FixedOffset,
        event_buffer_size: usize,
    ) -> Self {
        let (trip_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            trips: DashMap::new(),
            provider,
            rules,
            default_log_context,
            home_offset,
            trip_events_tx,
            metrics: Metrics::new(),
        }
    }
}
