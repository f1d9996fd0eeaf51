use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SECONDS_PER_HOUR: i64 = 3_600;

/// Fixed-point duration with one-second resolution.
///
/// Every duty-time counter in the planner uses this type so that long
/// chains of additions stay exact. On the wire it is a decimal number of
/// hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(i64);

impl Hours {
    pub const ZERO: Hours = Hours(0);

    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: i64) -> Self {
        Self(hours * SECONDS_PER_HOUR)
    }

    /// Rounds to the nearest second. Non-finite input becomes zero.
    pub fn from_hours_f64(hours: f64) -> Self {
        if !hours.is_finite() {
            return Self::ZERO;
        }
        Self((hours * SECONDS_PER_HOUR as f64).round() as i64)
    }

    /// Time needed to cover `miles` at `mph`.
    pub fn for_distance(miles: f64, mph: f64) -> Self {
        Self::from_hours_f64(miles / mph)
    }

    pub const fn as_seconds(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SECONDS_PER_HOUR as f64
    }

    /// Miles covered in this much time at `mph`.
    pub fn distance_at(self, mph: f64) -> f64 {
        self.as_f64() * mph
    }

    pub fn to_delta(self) -> TimeDelta {
        TimeDelta::seconds(self.0)
    }

    pub fn from_delta(delta: TimeDelta) -> Self {
        Self(delta.num_seconds())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, other: Hours) -> Hours {
        Hours((self.0 - other.0).max(0))
    }

    pub fn clamp_to(self, min: Hours, max: Hours) -> Hours {
        Hours(self.0.clamp(min.0, max.0))
    }

    pub fn ratio(self, whole: Hours) -> f64 {
        if whole.0 == 0 {
            return 1.0;
        }
        self.0 as f64 / whole.0 as f64
    }
}

impl Add for Hours {
    type Output = Hours;

    fn add(self, rhs: Hours) -> Hours {
        Hours(self.0 + rhs.0)
    }
}

impl AddAssign for Hours {
    fn add_assign(&mut self, rhs: Hours) {
        self.0 += rhs.0;
    }
}

impl Sub for Hours {
    type Output = Hours;

    fn sub(self, rhs: Hours) -> Hours {
        Hours(self.0 - rhs.0)
    }
}

impl SubAssign for Hours {
    fn sub_assign(&mut self, rhs: Hours) {
        self.0 -= rhs.0;
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Hours>>(iter: I) -> Hours {
        iter.fold(Hours::ZERO, Add::add)
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.0.div_euclid(60);
        write!(f, "{}h{:02}m", minutes / 60, minutes % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hours value: {0}")]
pub struct ParseHoursError(String);

/// Parses decimal hours such as `"10"` or `"0.5"`.
impl FromStr for Hours {
    type Err = ParseHoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| ParseHoursError(s.to_string()))?;
        if !value.is_finite() {
            return Err(ParseHoursError(s.to_string()));
        }
        Ok(Hours::from_hours_f64(value))
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Hours::from_hours_f64(value))
    }
}
