use std::env;
use std::path::PathBuf;

use chrono::FixedOffset;

use crate::engine::rules::HosRules;
use crate::error::AppError;
use crate::models::log::LogContext;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub locations_file: Option<PathBuf>,
    pub road_factor: f64,
    pub home_utc_offset_hours: i32,
    pub default_log_context: LogContext,
    pub rules: HosRules,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let defaults = HosRules::default();
        let rules = HosRules {
            max_driving: parse_or_default("MAX_DRIVING_HOURS", defaults.max_driving)?,
            max_on_duty_window: parse_or_default("MAX_ON_DUTY_HOURS", defaults.max_on_duty_window)?,
            max_cycle: parse_or_default("MAX_CYCLE_HOURS", defaults.max_cycle)?,
            cycle_window_days: parse_or_default("CYCLE_WINDOW_DAYS", defaults.cycle_window_days)?,
            cycle_rule: parse_or_default("CYCLE_RULE", defaults.cycle_rule)?,
            reset_cycle_credit: parse_or_default(
                "RESET_CYCLE_CREDIT_HOURS",
                defaults.reset_cycle_credit,
            )?,
            break_after: parse_or_default("BREAK_AFTER_HOURS", defaults.break_after)?,
            break_length: parse_or_default("BREAK_LENGTH_HOURS", defaults.break_length)?,
            reset_length: parse_or_default("RESET_HOURS", defaults.reset_length)?,
            fuel_interval_miles: parse_or_default(
                "FUEL_INTERVAL_MILES",
                defaults.fuel_interval_miles,
            )?,
            fuel_stop: parse_or_default("FUEL_STOP_HOURS", defaults.fuel_stop)?,
            average_speed_mph: parse_or_default("AVERAGE_SPEED_MPH", defaults.average_speed_mph)?,
            pickup_dropoff: parse_or_default("PICKUP_DROPOFF_HOURS", defaults.pickup_dropoff)?,
        };
        rules
            .validate()
            .map_err(|err| AppError::Internal(format!("invalid HOS configuration: {err}")))?;

        let road_factor: f64 = parse_or_default("ROAD_FACTOR", 1.2)?;
        if !(road_factor.is_finite() && road_factor > 0.0) {
            return Err(AppError::Internal(format!(
                "invalid ROAD_FACTOR: {road_factor}"
            )));
        }

        let home_utc_offset_hours = parse_or_default("HOME_TERMINAL_UTC_OFFSET_HOURS", 0)?;
        if !(-23..=23).contains(&home_utc_offset_hours) {
            return Err(AppError::Internal(format!(
                "invalid HOME_TERMINAL_UTC_OFFSET_HOURS: {home_utc_offset_hours}"
            )));
        }

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            locations_file: env::var("LOCATIONS_FILE").ok().map(PathBuf::from),
            road_factor,
            home_utc_offset_hours,
            default_log_context: LogContext {
                driver_name: env::var("DEFAULT_DRIVER_NAME")
                    .unwrap_or_else(|_| "Sample Driver".to_string()),
                truck_number: env::var("DEFAULT_TRUCK_NUMBER")
                    .unwrap_or_else(|_| "12345".to_string()),
                carrier_name: env::var("DEFAULT_CARRIER_NAME")
                    .unwrap_or_else(|_| "Sample Carrier".to_string()),
            },
            rules,
        })
    }

    pub fn home_offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.home_utc_offset_hours * 3_600).ok_or_else(|| {
            AppError::Internal(format!(
                "invalid home terminal offset: {}h",
                self.home_utc_offset_hours
            ))
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
