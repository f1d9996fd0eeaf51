use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::timeline::{DutyStatus, DutyTotals};

/// Who the log sheet belongs to. Always supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    pub driver_name: String,
    pub truck_number: String,
    pub carrier_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub time: String,
    pub status: DutyStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub time: String,
    pub location: String,
    #[serde(rename = "type")]
    pub event_type: String,
}

/// One day of the driver's log as handed to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub date: NaiveDate,
    pub driver_name: String,
    pub truck_number: String,
    pub carrier_name: String,
    pub status_samples: Vec<SampleRecord>,
    pub events: Vec<EventRecord>,
    pub totals: DutyTotals,
}
