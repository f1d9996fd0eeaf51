use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::engine::rules::{CycleRule, HosRules};
use crate::models::hours::Hours;

/// Running account of on-duty hours counted against the multi-day cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleLedger {
    Rolling {
        window_days: u32,
        by_day: BTreeMap<NaiveDate, Hours>,
    },
    FixedOffset {
        used: Hours,
        credit: Hours,
    },
}

impl CycleLedger {
    /// Opens a ledger for a trip starting at `start` with `prior` hours
    /// already used.
    ///
    /// The rolling ledger has no per-day history for the prior hours, so
    /// they are spread evenly over the days preceding `start` that are
    /// still inside the window, any remainder landing on the most recent
    /// day.
    pub fn open(rules: &HosRules, start: NaiveDateTime, prior: Hours) -> Self {
        match rules.cycle_rule {
            CycleRule::FixedOffset => CycleLedger::FixedOffset {
                used: prior,
                credit: rules.reset_cycle_credit,
            },
            CycleRule::Rolling => {
                let window_days = rules.cycle_window_days.max(1);
                let prior_days = i64::from(window_days - 1).max(1);
                let share = prior.as_seconds() / prior_days;
                let remainder = prior.as_seconds() % prior_days;

                let mut by_day = BTreeMap::new();
                for offset in 1..=prior_days {
                    let amount = if offset == 1 { share + remainder } else { share };
                    if amount > 0 {
                        let date = start.date() - Days::new(offset as u64);
                        by_day.insert(date, Hours::from_seconds(amount));
                    }
                }

                CycleLedger::Rolling {
                    window_days,
                    by_day,
                }
            }
        }
    }

    /// Hours counted against the cycle as of `at`.
    pub fn used_at(&self, at: NaiveDateTime) -> Hours {
        match self {
            CycleLedger::FixedOffset { used, .. } => *used,
            CycleLedger::Rolling {
                window_days,
                by_day,
            } => {
                let today = at.date();
                let earliest = today - Days::new(u64::from(*window_days - 1));
                by_day.range(earliest..=today).map(|(_, hours)| *hours).sum()
            }
        }
    }

    /// Counts on-duty time beginning at `from`, split across midnights.
    pub fn record(&mut self, from: NaiveDateTime, duration: Hours) {
        match self {
            CycleLedger::FixedOffset { used, .. } => *used += duration,
            CycleLedger::Rolling { by_day, .. } => {
                let end = from + duration.to_delta();
                let mut cursor = from;
                while cursor < end {
                    let next_midnight = (cursor.date() + Days::new(1)).and_time(NaiveTime::MIN);
                    let chunk_end = end.min(next_midnight);
                    *by_day.entry(cursor.date()).or_default() += Hours::from_delta(chunk_end - cursor);
                    cursor = chunk_end;
                }
            }
        }
    }

    /// Applies the cycle side of a completed reset.
    pub fn apply_reset(&mut self) {
        if let CycleLedger::FixedOffset { used, credit } = self {
            *used = used.saturating_sub(*credit);
        }
    }
}
