pub mod cycle;
pub mod logbook;
pub mod rules;
pub mod segmenter;
pub mod timeline;

use chrono::NaiveDateTime;
use tracing::error;

use crate::engine::rules::HosRules;
use crate::error::PlanError;
use crate::geo::DistanceProvider;
use crate::models::stop::RouteResult;
use crate::models::timeline::DutyStatusTimeline;
use crate::models::trip::TripRequest;

/// Everything one planning run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub route: RouteResult,
    pub timelines: Vec<DutyStatusTimeline>,
}

/// Segments the trip and builds its daily timelines. Either both succeed
/// or nothing is returned.
pub fn plan_trip(
    request: &TripRequest,
    provider: &dyn DistanceProvider,
    rules: &HosRules,
    start: NaiveDateTime,
) -> Result<TripPlan, PlanError> {
    let route = segmenter::plan(request, provider, rules, start)?;
    let timelines = timeline::build_timelines(&route).inspect_err(|err| {
        error!(error = %err, "segmenter produced stops the timeline builder rejected");
    })?;

    Ok(TripPlan { route, timelines })
}
