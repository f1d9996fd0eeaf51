//! Splits a trip into driving stretches and the stops the HOS rules force
//! between them.
//!
//! The driver is assumed to come on duty fresh at the START stop: the
//! driving allowance and the on-duty window both open there, while the
//! cycle starts from the hours the request says are already used.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDateTime};
use tracing::debug;

use crate::engine::cycle::CycleLedger;
use crate::engine::rules::HosRules;
use crate::error::PlanError;
use crate::geo::{DistanceProvider, LegDistance, ProviderError};
use crate::models::hours::Hours;
use crate::models::stop::{GeoPoint, RouteResult, Stop, StopType};
use crate::models::trip::TripRequest;

/// Calendar years a trip may start in. Far enough from chrono's limits
/// that no trip can run off the end of the calendar.
pub const START_YEARS: RangeInclusive<i32> = 1900..=9999;

/// Plans the stops for `request`, starting the clock at `start`.
///
/// Fails if `start` is out of range, the provider cannot resolve a leg
/// or `rules` is unusable.
pub fn plan(
    request: &TripRequest,
    provider: &dyn DistanceProvider,
    rules: &HosRules,
    start: NaiveDateTime,
) -> Result<RouteResult, PlanError> {
    rules.validate()?;
    if !START_YEARS.contains(&start.year()) {
        return Err(PlanError::StartOutOfRange(start));
    }

    let to_pickup = resolve_leg(provider, &request.current_location, &request.pickup_location)?;
    let to_dropoff = resolve_leg(provider, &request.pickup_location, &request.dropoff_location)?;

    let prior = clamp_cycle_hours(request.cycle_hours_used, rules.max_cycle);
    let mut sim = Simulation::new(rules, start, prior);

    sim.work_stop(
        StopType::Start,
        request.current_location.clone(),
        to_pickup.origin,
        Hours::ZERO,
    );

    sim.drive_leg(&to_pickup);
    sim.ensure_capacity(rules.pickup_dropoff, to_pickup.destination);
    sim.work_stop(
        StopType::Pickup,
        request.pickup_location.clone(),
        to_pickup.destination,
        rules.pickup_dropoff,
    );

    sim.drive_leg(&to_dropoff);
    sim.ensure_capacity(rules.pickup_dropoff, to_dropoff.destination);
    sim.work_stop(
        StopType::Dropoff,
        request.dropoff_location.clone(),
        to_dropoff.destination,
        rules.pickup_dropoff,
    );

    Ok(RouteResult {
        total_distance_miles: to_pickup.distance_miles + to_dropoff.distance_miles,
        total_driving_hours: sim.driving_total,
        stops: sim.stops,
    })
}

/// Clamps the requested cycle hours into `[0, cap]`; NaN counts as zero.
pub fn clamp_cycle_hours(raw: f64, cap: Hours) -> Hours {
    if raw.is_nan() {
        return Hours::ZERO;
    }
    Hours::from_hours_f64(raw.clamp(0.0, cap.as_f64())).clamp_to(Hours::ZERO, cap)
}

fn resolve_leg(
    provider: &dyn DistanceProvider,
    from: &str,
    to: &str,
) -> Result<LegDistance, PlanError> {
    let leg = provider.resolve(from, to)?;
    if !(leg.distance_miles.is_finite() && leg.distance_miles >= 0.0) {
        return Err(PlanError::InfeasibleRoute(ProviderError::Unavailable(
            format!("provider returned distance {} for {from} -> {to}", leg.distance_miles),
        )));
    }
    Ok(leg)
}

struct Simulation<'r> {
    rules: &'r HosRules,
    clock: NaiveDateTime,
    driving_in_period: Hours,
    window_elapsed: Hours,
    driving_since_break: Hours,
    miles_since_fuel: f64,
    driving_total: Hours,
    cycle: CycleLedger,
    stops: Vec<Stop>,
}

impl<'r> Simulation<'r> {
    fn new(rules: &'r HosRules, start: NaiveDateTime, prior: Hours) -> Self {
        Self {
            rules,
            clock: start,
            driving_in_period: Hours::ZERO,
            window_elapsed: Hours::ZERO,
            driving_since_break: Hours::ZERO,
            miles_since_fuel: 0.0,
            driving_total: Hours::ZERO,
            cycle: CycleLedger::open(rules, start, prior),
            stops: Vec::new(),
        }
    }

    fn drive_leg(&mut self, leg: &LegDistance) {
        let speed = leg
            .speed_mph
            .filter(|mph| mph.is_finite() && *mph > 0.0)
            .unwrap_or(self.rules.average_speed_mph);
        let leg_time = Hours::for_distance(leg.distance_miles, speed);
        let mut driven = Hours::ZERO;

        while driven < leg_time {
            let position = leg.origin.lerp(&leg.destination, driven.ratio(leg_time));
            let miles_to_fuel = (self.rules.fuel_interval_miles - self.miles_since_fuel).max(0.0);
            let until_fuel = Hours::for_distance(miles_to_fuel, speed);
            let fuel_due = until_fuel.is_zero();

            if fuel_due && self.can_work(self.rules.fuel_stop) {
                let name = self.stop_name("Fuel stop");
                self.work_stop(StopType::Fuel, name, position, self.rules.fuel_stop);
                self.miles_since_fuel = 0.0;
                continue;
            }

            if self.driving_since_break >= self.rules.break_after {
                self.rest_break(position);
                continue;
            }

            // A fuel stop that no longer fits in the window waits for the reset.
            let allowance = self.driving_allowance();
            if fuel_due || allowance.is_zero() {
                self.reset(position);
                continue;
            }

            let until_break = self.rules.break_after - self.driving_since_break;
            let step = (leg_time - driven)
                .min(until_fuel)
                .min(until_break)
                .min(allowance);
            self.drive(step, speed);
            driven += step;
        }
    }

    fn driving_allowance(&self) -> Hours {
        let period = self.rules.max_driving.saturating_sub(self.driving_in_period);
        period.min(self.window_remaining()).min(self.cycle_remaining())
    }

    fn window_remaining(&self) -> Hours {
        self.rules
            .max_on_duty_window
            .saturating_sub(self.window_elapsed)
    }

    fn cycle_remaining(&self) -> Hours {
        self.rules
            .max_cycle
            .saturating_sub(self.cycle.used_at(self.clock))
    }

    fn can_work(&self, needed: Hours) -> bool {
        self.window_remaining() >= needed && self.cycle_remaining() >= needed
    }

    /// Resets until `needed` hours of on-duty work fit. Validated rules
    /// guarantee a fresh window can hold it, and the rolling cycle empties
    /// after at most one window of resets.
    fn ensure_capacity(&mut self, needed: Hours, position: GeoPoint) {
        while !self.can_work(needed) {
            self.reset(position);
        }
    }

    fn drive(&mut self, step: Hours, speed: f64) {
        self.cycle.record(self.clock, step);
        self.clock += step.to_delta();
        self.driving_in_period += step;
        self.window_elapsed += step;
        self.driving_since_break += step;
        self.driving_total += step;
        self.miles_since_fuel += step.distance_at(speed);
    }

    fn work_stop(&mut self, stop_type: StopType, location: String, at: GeoPoint, dwell: Hours) {
        self.push_stop(stop_type, location, at, dwell);
        self.cycle.record(self.clock, dwell);
        self.clock += dwell.to_delta();
        self.window_elapsed += dwell;
    }

    fn rest_break(&mut self, at: GeoPoint) {
        let length = self.rules.break_length;
        let name = self.stop_name("Rest break");
        self.push_stop(StopType::Rest, name, at, length);
        self.clock += length.to_delta();
        self.window_elapsed += length;
        self.driving_since_break = Hours::ZERO;
    }

    /// Back-to-back resets extend the previous SLEEP rather than stacking
    /// a second one.
    fn reset(&mut self, at: GeoPoint) {
        let length = self.rules.reset_length;
        let clock = self.clock;
        let extends_sleep = matches!(
            self.stops.last(),
            Some(last) if last.stop_type == StopType::Sleep && last.end_time() == clock
        );

        if extends_sleep {
            if let Some(last) = self.stops.last_mut() {
                last.departure_time = Some(clock + length.to_delta());
                debug!(location = %last.location, until = ?last.departure_time, "sleep extended");
            }
        } else {
            let name = self.stop_name("Sleep break");
            self.push_stop(StopType::Sleep, name, at, length);
        }

        self.clock += length.to_delta();
        self.driving_in_period = Hours::ZERO;
        self.window_elapsed = Hours::ZERO;
        self.driving_since_break = Hours::ZERO;
        self.cycle.apply_reset();
    }

    fn push_stop(&mut self, stop_type: StopType, location: String, at: GeoPoint, dwell: Hours) {
        debug!(
            stop_type = %stop_type,
            location = %location,
            arrival = %self.clock,
            dwell = %dwell,
            "stop planned"
        );
        self.stops.push(Stop {
            location,
            arrival_time: self.clock,
            departure_time: Some(self.clock + dwell.to_delta()),
            stop_type,
            latitude: at.lat,
            longitude: at.lng,
        });
    }

    fn stop_name(&self, label: &str) -> String {
        format!("{label} {}", self.stops.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeDelta};
    use proptest::prelude::*;

    use super::*;
    use crate::engine::rules::CycleRule;
    use crate::geo::StaticDistanceTable;
    use crate::models::timeline::DutyStatus;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn provider(first_leg: f64, second_leg: f64) -> StaticDistanceTable {
        StaticDistanceTable::new()
            .with_location("Yard", GeoPoint { lat: 40.0, lng: -100.0 })
            .with_location("Shipper", GeoPoint { lat: 40.0, lng: -90.0 })
            .with_location("Receiver", GeoPoint { lat: 35.0, lng: -80.0 })
            .with_leg("Yard", "Shipper", first_leg)
            .with_leg("Shipper", "Receiver", second_leg)
    }

    fn request(cycle_hours_used: f64) -> TripRequest {
        TripRequest {
            current_location: "Yard".to_string(),
            pickup_location: "Shipper".to_string(),
            dropoff_location: "Receiver".to_string(),
            cycle_hours_used,
        }
    }

    fn types(route: &RouteResult) -> Vec<StopType> {
        route.stops.iter().map(|stop| stop.stop_type).collect()
    }

    fn hours(h: i64) -> TimeDelta {
        TimeDelta::hours(h)
    }

    #[test]
    fn short_trip_needs_no_intermediate_stops() {
        let route = plan(&request(0.0), &provider(110.0, 55.0), &HosRules::default(), start()).unwrap();

        assert_eq!(
            types(&route),
            vec![StopType::Start, StopType::Pickup, StopType::Dropoff]
        );
        assert_eq!(route.total_driving_hours, Hours::from_hours(3));
        assert_eq!(route.stops[1].arrival_time, start() + hours(2));
        assert_eq!(route.stops[2].arrival_time, start() + hours(4));
        assert_eq!(route.stops[2].departure_time, Some(start() + hours(5)));
    }

    #[test]
    fn zero_distance_legs_produce_no_intermediate_stops() {
        let table = provider(0.0, 0.0);
        let request = TripRequest {
            current_location: "Shipper".to_string(),
            pickup_location: "Shipper".to_string(),
            dropoff_location: "Shipper".to_string(),
            cycle_hours_used: 0.0,
        };
        let route = plan(&request, &table, &HosRules::default(), start()).unwrap();

        assert_eq!(
            types(&route),
            vec![StopType::Start, StopType::Pickup, StopType::Dropoff]
        );
        assert_eq!(route.total_driving_hours, Hours::ZERO);
        assert_eq!(route.stops[2].arrival_time, start() + hours(1));
    }

    #[test]
    fn fuel_wins_tie_with_break() {
        let rules = HosRules {
            fuel_interval_miles: 440.0,
            ..HosRules::default()
        };
        let route = plan(&request(0.0), &provider(600.0, 0.0), &rules, start()).unwrap();

        assert_eq!(route.stops[1].stop_type, StopType::Fuel);
        assert_eq!(route.stops[1].arrival_time, start() + hours(8));
        assert_eq!(route.stops[2].stop_type, StopType::Rest);
        assert_eq!(
            route.stops[2].arrival_time,
            start() + hours(8) + TimeDelta::minutes(30)
        );
    }

    #[test]
    fn second_leg_runs_the_compliance_loop() {
        let route = plan(&request(0.0), &provider(55.0, 1_100.0), &HosRules::default(), start()).unwrap();
        let pickup = route
            .stops
            .iter()
            .position(|stop| stop.stop_type == StopType::Pickup)
            .unwrap();
        let after_pickup: Vec<StopType> = route.stops[pickup + 1..]
            .iter()
            .map(|stop| stop.stop_type)
            .collect();

        assert!(after_pickup.contains(&StopType::Rest));
        assert!(after_pickup.contains(&StopType::Sleep));
        assert!(after_pickup.contains(&StopType::Fuel));
        assert_eq!(after_pickup.last(), Some(&StopType::Dropoff));
    }

    #[test]
    fn totals_are_exact() {
        let route = plan(&request(12.5), &provider(55.0, 1_100.0), &HosRules::default(), start()).unwrap();
        assert_eq!(route.total_driving_hours, Hours::from_hours(21));

        let dropoff = route.stops.last().unwrap();
        let dwell: Hours = route.stops[..route.stops.len() - 1]
            .iter()
            .map(Stop::dwell)
            .sum();
        assert_eq!(
            dropoff.arrival_time,
            start() + (route.total_driving_hours + dwell).to_delta()
        );
    }

    #[test]
    fn full_cycle_sleeps_before_driving_rolling() {
        let route = plan(&request(70.0), &provider(110.0, 55.0), &HosRules::default(), start()).unwrap();
        let sleep = &route.stops[1];

        assert_eq!(sleep.stop_type, StopType::Sleep);
        assert_eq!(sleep.arrival_time, start());
        // One reset is not enough; the sleep runs on until a prior day drops
        // out of the window at midnight.
        assert_eq!(sleep.departure_time, Some(start() + hours(20)));
        assert_eq!(route.count(StopType::Sleep), 1);
    }

    #[test]
    fn full_cycle_sleeps_before_driving_fixed_offset() {
        let rules = HosRules {
            cycle_rule: CycleRule::FixedOffset,
            ..HosRules::default()
        };
        let route = plan(&request(70.0), &provider(110.0, 55.0), &rules, start()).unwrap();
        let sleep = &route.stops[1];

        assert_eq!(sleep.stop_type, StopType::Sleep);
        assert_eq!(sleep.arrival_time, start());
        assert_eq!(sleep.departure_time, Some(start() + hours(10)));
    }

    #[test]
    fn out_of_range_cycle_hours_are_clamped() {
        let table = provider(500.0, 700.0);
        let rules = HosRules::default();

        let over = plan(&request(95.0), &table, &rules, start()).unwrap();
        let capped = plan(&request(70.0), &table, &rules, start()).unwrap();
        assert_eq!(over, capped);

        let negative = plan(&request(-4.0), &table, &rules, start()).unwrap();
        let zero = plan(&request(0.0), &table, &rules, start()).unwrap();
        assert_eq!(negative, zero);

        assert_eq!(clamp_cycle_hours(f64::NAN, rules.max_cycle), Hours::ZERO);
        assert_eq!(clamp_cycle_hours(f64::INFINITY, rules.max_cycle), rules.max_cycle);
    }

    #[test]
    fn provider_speed_overrides_default() {
        let table = StaticDistanceTable::new()
            .with_location("Yard", GeoPoint { lat: 0.0, lng: 0.0 })
            .with_location("Shipper", GeoPoint { lat: 0.0, lng: 1.0 })
            .with_location("Receiver", GeoPoint { lat: 0.0, lng: 2.0 })
            .with_leg_at_speed("Yard", "Shipper", 120.0, 60.0)
            .with_leg("Shipper", "Receiver", 0.0);
        let route = plan(&request(0.0), &table, &HosRules::default(), start()).unwrap();

        assert_eq!(route.total_driving_hours, Hours::from_hours(2));
    }

    #[test]
    fn intermediate_stops_sit_between_leg_endpoints() {
        let route = plan(&request(0.0), &provider(800.0, 0.0), &HosRules::default(), start()).unwrap();
        let rest = route
            .stops
            .iter()
            .find(|stop| stop.stop_type == StopType::Rest)
            .unwrap();

        assert_eq!(rest.latitude, 40.0);
        assert!(rest.longitude > -100.0 && rest.longitude < -90.0);
        assert_eq!(rest.location, "Rest break 1");
    }

    #[test]
    fn unknown_location_is_infeasible() {
        let mut bad = request(0.0);
        bad.dropoff_location = "Nowhere".to_string();
        let err = plan(&bad, &provider(10.0, 10.0), &HosRules::default(), start()).unwrap_err();

        assert!(matches!(
            err,
            PlanError::InfeasibleRoute(ProviderError::UnknownLocation(ref name)) if name == "Nowhere"
        ));
    }

    #[test]
    fn negative_provider_distance_is_infeasible() {
        let err = plan(&request(0.0), &provider(-5.0, 10.0), &HosRules::default(), start()).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InfeasibleRoute(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn start_outside_supported_years_is_rejected() {
        let table = provider(500.0, 700.0);
        for date in [
            NaiveDate::from_ymd_opt(262_142, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(-262_143, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(1899, 12, 31).unwrap(),
        ] {
            let at = date.and_hms_opt(0, 0, 0).unwrap();
            let err = plan(&request(35.0), &table, &HosRules::default(), at).unwrap_err();
            assert!(matches!(err, PlanError::StartOutOfRange(when) if when == at));
        }

        let last_day = NaiveDate::from_ymd_opt(9999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        assert!(plan(&request(70.0), &table, &HosRules::default(), last_day).is_ok());
    }

    /// Replays the route through a fresh ledger and returns the cycle hours
    /// seen at the end of every drive and work stop, and just before each
    /// midnight crossed along the way.
    fn replay_cycle(route: &RouteResult, rules: &HosRules, prior: Hours) -> Vec<(NaiveDateTime, Hours)> {
        let start = route.stops[0].arrival_time;
        let mut ledger = CycleLedger::open(rules, start, prior);
        let mut seen = Vec::new();

        let mut record = |ledger: &mut CycleLedger, from: NaiveDateTime, until: NaiveDateTime| {
            ledger.record(from, Hours::from_delta(until - from));
            let mut day = from.date();
            while let Some(next) = day.succ_opt() {
                let midnight = next.and_time(NaiveTime::MIN);
                if midnight >= until {
                    break;
                }
                let before = midnight - TimeDelta::seconds(1);
                seen.push((before, ledger.used_at(before)));
                day = next;
            }
            seen.push((until, ledger.used_at(until)));
        };

        for (index, stop) in route.stops.iter().enumerate() {
            if index > 0 {
                let previous = &route.stops[index - 1];
                if previous.stop_type.resumes_driving() && previous.end_time() < stop.arrival_time {
                    record(&mut ledger, previous.end_time(), stop.arrival_time);
                }
            }
            match stop.stop_type {
                StopType::Sleep => {
                    let resets = stop.dwell().as_seconds() / rules.reset_length.as_seconds();
                    for _ in 0..resets {
                        ledger.apply_reset();
                    }
                }
                kind if kind.stationary_status() == DutyStatus::OnDuty => {
                    record(&mut ledger, stop.arrival_time, stop.end_time());
                }
                _ => {}
            }
        }

        seen
    }

    #[test]
    fn replay_matches_known_cycle() {
        let rules = HosRules::default();
        let route = plan(&request(60.0), &provider(110.0, 55.0), &rules, start()).unwrap();
        let seen = replay_cycle(&route, &rules, Hours::from_hours(60));

        // START, two hours of driving, then the one-hour pickup.
        assert_eq!(seen[0], (start(), Hours::from_hours(60)));
        assert_eq!(seen[1], (start() + hours(2), Hours::from_hours(62)));
        assert_eq!(seen[2], (start() + hours(3), Hours::from_hours(63)));
    }

    fn cycle_rule() -> impl Strategy<Value = CycleRule> {
        prop_oneof![Just(CycleRule::Rolling), Just(CycleRule::FixedOffset)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn cycle_never_exceeds_cap(
            first_leg in 0.0f64..3_000.0,
            second_leg in 0.0f64..3_000.0,
            cycle_hours in 0.0f64..=70.0,
            hour in 0u32..24,
            rule in cycle_rule(),
        ) {
            let rules = HosRules { cycle_rule: rule, ..HosRules::default() };
            let at = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(hour, 0, 0).unwrap();
            let route = plan(&request(cycle_hours), &provider(first_leg, second_leg), &rules, at).unwrap();
            let prior = clamp_cycle_hours(cycle_hours, rules.max_cycle);

            for (when, used) in replay_cycle(&route, &rules, prior) {
                prop_assert!(used <= rules.max_cycle, "{used} used at {when}");
            }
        }
    }
}
