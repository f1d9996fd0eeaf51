use crate::models::log::{EventRecord, LogContext, LogRecord, SampleRecord};
use crate::models::timeline::DutyStatusTimeline;

const CLOCK_FORMAT: &str = "%H:%M";

/// Renders a day's timeline into the persisted log shape.
pub fn assemble(timeline: &DutyStatusTimeline, context: &LogContext) -> LogRecord {
    LogRecord {
        date: timeline.date,
        driver_name: context.driver_name.clone(),
        truck_number: context.truck_number.clone(),
        carrier_name: context.carrier_name.clone(),
        status_samples: timeline
            .samples
            .iter()
            .map(|sample| SampleRecord {
                time: sample.time.format(CLOCK_FORMAT).to_string(),
                status: sample.status,
            })
            .collect(),
        events: timeline
            .events
            .iter()
            .map(|event| EventRecord {
                time: event.time.format(CLOCK_FORMAT).to_string(),
                location: event.location.clone(),
                event_type: event.kind.to_string(),
            })
            .collect(),
        totals: timeline.totals,
    }
}
