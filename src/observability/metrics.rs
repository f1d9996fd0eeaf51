use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub trips_planned_total: IntCounterVec,
    pub planning_latency_seconds: HistogramVec,
    pub stops_planned_total: IntCounterVec,
    pub trips_stored: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let trips_planned_total = IntCounterVec::new(
            Opts::new("trips_planned_total", "Total planning runs by outcome"),
            &["outcome"],
        )
        .expect("valid trips_planned_total metric");

        let planning_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "planning_latency_seconds",
                "Latency of trip planning in seconds",
            )
            .buckets(vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1]),
            &["outcome"],
        )
        .expect("valid planning_latency_seconds metric");

        let stops_planned_total = IntCounterVec::new(
            Opts::new("stops_planned_total", "Planned stops by stop type"),
            &["stop_type"],
        )
        .expect("valid stops_planned_total metric");

        let trips_stored = IntGauge::new("trips_stored", "Trips currently held in storage")
            .expect("valid trips_stored metric");

        registry
            .register(Box::new(trips_planned_total.clone()))
            .expect("register trips_planned_total");
        registry
            .register(Box::new(planning_latency_seconds.clone()))
            .expect("register planning_latency_seconds");
        registry
            .register(Box::new(stops_planned_total.clone()))
            .expect("register stops_planned_total");
        registry
            .register(Box::new(trips_stored.clone()))
            .expect("register trips_stored");

        Self {
            registry,
            trips_planned_total,
            planning_latency_seconds,
            stops_planned_total,
            trips_stored,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
