//! Time-based trigger schedules for unattended inbox runs.
//!
//! Schedules are written on the command line as `daily@H`, `weekly@DAY@H`
//! or `every@N` and rendered to six-field cron expressions
//! (`sec min hour day-of-month month day-of-week`). Hours are wall-clock
//! hours in whatever time zone the scheduler evaluates the cron in; the
//! `watch` command uses the host's local zone.

use std::str::FromStr;

use chrono::Weekday;

use crate::ConfigError;

/// Interval lengths accepted by [`TriggerSchedule::EveryHours`]; each divides
/// a day evenly.
pub const ALLOWED_HOUR_INTERVALS: [u32; 6] = [1, 2, 4, 6, 8, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSchedule {
    DailyAt { hour: u32 },
    WeeklyOn { weekday: Weekday, hour: u32 },
    EveryHours { hours: u32 },
}

impl TriggerSchedule {
    /// Cron expression understood by `tokio-cron-scheduler`.
    #[must_use]
    pub fn to_cron(&self) -> String {
        match self {
            TriggerSchedule::DailyAt { hour } => format!("0 0 {hour} * * *"),
            TriggerSchedule::WeeklyOn { weekday, hour } => format!("0 0 {hour} * * {weekday}"),
            TriggerSchedule::EveryHours { hours } => format!("0 0 */{hours} * * *"),
        }
    }
}

impl std::fmt::Display for TriggerSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerSchedule::DailyAt { hour } => write!(f, "daily at {hour:02}:00"),
            TriggerSchedule::WeeklyOn { weekday, hour } => {
                write!(f, "weekly on {weekday} at {hour:02}:00")
            }
            TriggerSchedule::EveryHours { hours } => write!(f, "every {hours}h"),
        }
    }
}

impl FromStr for TriggerSchedule {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidSchedule {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = spec.trim().split('@').map(str::trim).collect();
        match parts.as_slice() {
            [kind, hour] if kind.eq_ignore_ascii_case("daily") => Ok(TriggerSchedule::DailyAt {
                hour: parse_hour(hour).ok_or_else(|| invalid("hour must be 0-23"))?,
            }),
            [kind, day, hour] if kind.eq_ignore_ascii_case("weekly") => {
                let weekday = day
                    .parse::<Weekday>()
                    .map_err(|_| invalid("unknown weekday"))?;
                Ok(TriggerSchedule::WeeklyOn {
                    weekday,
                    hour: parse_hour(hour).ok_or_else(|| invalid("hour must be 0-23"))?,
                })
            }
            [kind, hours] if kind.eq_ignore_ascii_case("every") => {
                let hours = hours
                    .parse::<u32>()
                    .ok()
                    .filter(|h| ALLOWED_HOUR_INTERVALS.contains(h))
                    .ok_or_else(|| invalid("interval must be one of 1, 2, 4, 6, 8, 12 hours"))?;
                Ok(TriggerSchedule::EveryHours { hours })
            }
            _ => Err(invalid("expected daily@H, weekly@DAY@H or every@N")),
        }
    }
}

fn parse_hour(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|h| *h < 24)
}
