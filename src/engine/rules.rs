//! Hours-of-service limits used by the segmenter.

use std::fmt;
use std::str::FromStr;

use crate::error::PlanError;
use crate::models::hours::Hours;

/// How a 10-hour reset affects hours already counted against the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleRule {
    /// On-duty time is tallied per calendar day and only the last
    /// `cycle_window_days` days count.
    Rolling,

    /// Every reset credits back `reset_cycle_credit`, regardless of when
    /// the hours were worked.
    FixedOffset,
}

impl FromStr for CycleRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rolling" => Ok(CycleRule::Rolling),
            "fixed-offset" | "fixed_offset" => Ok(CycleRule::FixedOffset),
            other => Err(format!(
                "unknown cycle rule: {other}, expected rolling/fixed-offset"
            )),
        }
    }
}

impl fmt::Display for CycleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleRule::Rolling => f.write_str("rolling"),
            CycleRule::FixedOffset => f.write_str("fixed-offset"),
        }
    }
}

/// Regulatory and operational constants for one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct HosRules {
    /// Driving allowed between two resets.
    pub max_driving: Hours,

    /// Length of the on-duty window opened when a duty period starts.
    /// Breaks do not extend it.
    pub max_on_duty_window: Hours,

    /// Cap on on-duty hours counted against the multi-day cycle.
    pub max_cycle: Hours,

    pub cycle_window_days: u32,
    pub cycle_rule: CycleRule,

    /// Only used by [`CycleRule::FixedOffset`].
    pub reset_cycle_credit: Hours,

    /// Cumulative driving after which a break is mandatory.
    pub break_after: Hours,
    pub break_length: Hours,

    /// Consecutive off-duty time that restores the daily allowances.
    pub reset_length: Hours,

    pub fuel_interval_miles: f64,
    pub fuel_stop: Hours,

    /// Used for legs where the distance provider gives no speed.
    pub average_speed_mph: f64,

    /// Dwell at pickup and at dropoff.
    pub pickup_dropoff: Hours,
}

impl HosRules {
    /// Rejects rule sets under which the planner could not make progress.
    pub fn validate(&self) -> Result<(), PlanError> {
        let positive = [
            ("max_driving", self.max_driving),
            ("max_on_duty_window", self.max_on_duty_window),
            ("max_cycle", self.max_cycle),
            ("break_after", self.break_after),
            ("reset_length", self.reset_length),
        ];
        for (name, value) in positive {
            if value <= Hours::ZERO {
                return Err(PlanError::InvalidRules(format!("{name} must be > 0")));
            }
        }

        let non_negative = [
            ("break_length", self.break_length),
            ("fuel_stop", self.fuel_stop),
            ("pickup_dropoff", self.pickup_dropoff),
            ("reset_cycle_credit", self.reset_cycle_credit),
        ];
        for (name, value) in non_negative {
            if value < Hours::ZERO {
                return Err(PlanError::InvalidRules(format!("{name} must be >= 0")));
            }
        }

        if !(self.average_speed_mph.is_finite() && self.average_speed_mph > 0.0) {
            return Err(PlanError::InvalidRules(
                "average_speed_mph must be a positive number".to_string(),
            ));
        }
        if !(self.fuel_interval_miles.is_finite() && self.fuel_interval_miles > 0.0) {
            return Err(PlanError::InvalidRules(
                "fuel_interval_miles must be a positive number".to_string(),
            ));
        }
        if self.cycle_window_days == 0 {
            return Err(PlanError::InvalidRules(
                "cycle_window_days must be > 0".to_string(),
            ));
        }
        // Prior hours are booked on the days before the start.
        if self.cycle_rule == CycleRule::Rolling && self.cycle_window_days < 2 {
            return Err(PlanError::InvalidRules(
                "cycle_window_days must be >= 2 with the rolling cycle rule".to_string(),
            ));
        }

        let longest_work_stop = self.fuel_stop.max(self.pickup_dropoff);
        if longest_work_stop > self.max_on_duty_window || longest_work_stop > self.max_cycle {
            return Err(PlanError::InvalidRules(
                "fuel and pickup/dropoff stops must fit in a fresh duty window".to_string(),
            ));
        }
        if self.cycle_rule == CycleRule::FixedOffset && self.reset_cycle_credit.is_zero() {
            return Err(PlanError::InvalidRules(
                "reset_cycle_credit must be > 0 with the fixed-offset cycle rule".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            max_driving: Hours::from_hours(11),
            max_on_duty_window: Hours::from_hours(14),
            max_cycle: Hours::from_hours(70),
            cycle_window_days: 8,
            cycle_rule: CycleRule::Rolling,
            reset_cycle_credit: Hours::from_hours(24),
            break_after: Hours::from_hours(8),
            break_length: Hours::from_minutes(30),
            reset_length: Hours::from_hours(10),
            fuel_interval_miles: 1_000.0,
            fuel_stop: Hours::from_minutes(30),
            average_speed_mph: 55.0,
            pickup_dropoff: Hours::from_hours(1),
        }
    }
}
