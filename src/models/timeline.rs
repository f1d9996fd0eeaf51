use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::hours::Hours;
use crate::models::stop::StopType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DutyStatus {
    #[serde(rename = "OFF")]
    OffDuty,
    #[serde(rename = "SB")]
    SleeperBerth,
    #[serde(rename = "D")]
    Driving,
    #[serde(rename = "ON")]
    OnDuty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSample {
    pub time: NaiveTime,
    pub status: DutyStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Arrival(StopType),
    Departure(StopType),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Arrival(stop_type) => write!(f, "{stop_type}"),
            EventKind::Departure(stop_type) => write!(f, "{stop_type}_DEPARTURE"),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub time: NaiveTime,
    pub location: String,
    pub kind: EventKind,
}

/// Time spent in each duty status over one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyTotals {
    pub off: Hours,
    pub sleeper: Hours,
    pub driving: Hours,
    pub on_duty: Hours,
}

impl DutyTotals {
    pub fn add(&mut self, status: DutyStatus, amount: Hours) {
        match status {
            DutyStatus::OffDuty => self.off += amount,
            DutyStatus::SleeperBerth => self.sleeper += amount,
            DutyStatus::Driving => self.driving += amount,
            DutyStatus::OnDuty => self.on_duty += amount,
        }
    }

    pub fn total(&self) -> Hours {
        self.off + self.sleeper + self.driving + self.on_duty
    }

    /// Hours that count against the duty cycle.
    pub fn working(&self) -> Hours {
        self.driving + self.on_duty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutyStatusTimeline {
    pub date: NaiveDate,
    pub samples: Vec<StatusSample>,
    pub events: Vec<LogEvent>,
    pub totals: DutyTotals,
}
