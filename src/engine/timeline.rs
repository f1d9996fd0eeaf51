//! Turns planned stops into one duty-status record per calendar day.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::PlanError;
use crate::models::hours::Hours;
use crate::models::stop::{RouteResult, Stop};
use crate::models::timeline::{
    DutyStatus, DutyStatusTimeline, DutyTotals, EventKind, LogEvent, StatusSample,
};

pub const SLOT_MINUTES: i64 = 15;
pub const SLOTS_PER_DAY: usize = 96;

type StatusChange = (NaiveDateTime, DutyStatus);

/// Builds a timeline for every date from the first arrival to the last
/// departure, in date order.
pub fn build_timelines(route: &RouteResult) -> Result<Vec<DutyStatusTimeline>, PlanError> {
    let stops = ordered_stops(&route.stops)?;
    let Some(first) = stops.first() else {
        return Ok(Vec::new());
    };

    let first_date = first.arrival_time.date();
    let last_date = stops
        .iter()
        .map(|stop| stop.end_time().date())
        .max()
        .unwrap_or(first_date);

    let changes = status_changes(&stops);

    let timelines = first_date
        .iter_days()
        .take_while(|date| *date <= last_date)
        .map(|date| DutyStatusTimeline {
            date,
            samples: sample_day(date, &changes),
            events: day_events(date, &stops),
            totals: day_totals(date, &changes),
        })
        .collect();

    Ok(timelines)
}

/// Sorts by arrival and rejects stops that run backwards or overlap.
fn ordered_stops(stops: &[Stop]) -> Result<Vec<&Stop>, PlanError> {
    for stop in stops {
        if stop.end_time() < stop.arrival_time {
            return Err(PlanError::InvalidStopOrder(format!(
                "{} at {} departs {} before it arrives {}",
                stop.stop_type,
                stop.location,
                stop.end_time(),
                stop.arrival_time
            )));
        }
    }

    let mut ordered: Vec<&Stop> = stops.iter().collect();
    ordered.sort_by_key(|stop| stop.arrival_time);

    for pair in ordered.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        if next.arrival_time < previous.end_time() {
            return Err(PlanError::InvalidStopOrder(format!(
                "{} at {} arrives {} while {} at {} runs until {}",
                next.stop_type,
                next.location,
                next.arrival_time,
                previous.stop_type,
                previous.location,
                previous.end_time()
            )));
        }
    }

    Ok(ordered)
}

/// Every status change of the trip in time order. Before the first change
/// the driver is off duty.
fn status_changes(stops: &[&Stop]) -> Vec<StatusChange> {
    let mut changes = Vec::with_capacity(stops.len() * 2);
    for stop in stops {
        changes.push((stop.arrival_time, stop.stop_type.stationary_status()));
        if let Some(departure) = stop.departure_time {
            let next = if stop.stop_type.resumes_driving() {
                DutyStatus::Driving
            } else {
                DutyStatus::OffDuty
            };
            changes.push((departure, next));
        }
    }
    changes
}

/// Status of the latest change strictly before `before`.
fn status_before(changes: &[StatusChange], before: NaiveDateTime) -> DutyStatus {
    let idx = changes.partition_point(|(time, _)| *time < before);
    if idx == 0 {
        DutyStatus::OffDuty
    } else {
        changes[idx - 1].1
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// A change inside a slot decides the slot; otherwise the status carried
/// into it does.
fn sample_day(date: NaiveDate, changes: &[StatusChange]) -> Vec<StatusSample> {
    let day_start = midnight(date);
    (0..SLOTS_PER_DAY as i64)
        .map(|slot| {
            let slot_start = day_start + TimeDelta::minutes(slot * SLOT_MINUTES);
            let slot_end = slot_start + TimeDelta::minutes(SLOT_MINUTES);
            StatusSample {
                time: slot_start.time(),
                status: status_before(changes, slot_end),
            }
        })
        .collect()
}

fn day_totals(date: NaiveDate, changes: &[StatusChange]) -> DutyTotals {
    let day_start = midnight(date);
    let day_end = midnight(date + Days::new(1));

    let carried = changes.partition_point(|(time, _)| *time <= day_start);
    let mut status = if carried == 0 {
        DutyStatus::OffDuty
    } else {
        changes[carried - 1].1
    };

    let mut totals = DutyTotals::default();
    let mut cursor = day_start;
    for (time, next) in changes[carried..].iter().take_while(|(time, _)| *time < day_end) {
        totals.add(status, Hours::from_delta(*time - cursor));
        cursor = *time;
        status = *next;
    }
    totals.add(status, Hours::from_delta(day_end - cursor));
    totals
}

fn day_events(date: NaiveDate, stops: &[&Stop]) -> Vec<LogEvent> {
    let mut events = Vec::new();
    for stop in stops {
        let arrival_date = stop.arrival_time.date();
        let arrival_time = if arrival_date == date {
            Some(stop.arrival_time.time())
        } else if arrival_date < date && stop.end_time().date() >= date {
            // Carried over from an earlier day.
            Some(NaiveTime::MIN)
        } else {
            None
        };

        if let Some(time) = arrival_time {
            events.push(LogEvent {
                time,
                location: stop.location.clone(),
                kind: EventKind::Arrival(stop.stop_type),
            });
        }

        if let Some(departure) = stop.departure_time.filter(|dep| dep.date() == date) {
            events.push(LogEvent {
                time: departure.time(),
                location: stop.location.clone(),
                kind: EventKind::Departure(stop.stop_type),
            });
        }
    }
    events
}
