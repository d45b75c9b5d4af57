//! Daily schedule for the report fan-out and the retention sweep. All times are UTC.

use crate::domain::DomainError;
use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};

pub const DEFAULT_REPORT_TIME: &str = "23:59";
/// 23:59 + 6 min = 00:05, the sweep runs just after the day's reports.
pub const DEFAULT_CLEANUP_OFFSET_MINUTES: u32 = 6;
pub const DEFAULT_RETENTION_DAYS: u32 = 14;

/// Loaded once at startup; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub report_time: NaiveTime,
    pub cleanup_offset_minutes: u32,
    pub retention_days: u32,
}

impl ScheduleConfig {
    /// Build from a `HH:MM` string. Rejects anything outside 00:00..=23:59.
    pub fn new(
        report_time: &str,
        cleanup_offset_minutes: u32,
        retention_days: u32,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            report_time: parse_report_time(report_time)?,
            cleanup_offset_minutes,
            retention_days,
        })
    }

    /// Time of day of the retention sweep (wraps past midnight).
    pub fn cleanup_time(&self) -> NaiveTime {
        let offset = Duration::minutes(i64::from(self.cleanup_offset_minutes % (24 * 60)));
        self.report_time.overflowing_add_signed(offset).0
    }

    pub fn next_report_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_daily_occurrence(now, self.report_time)
    }

    pub fn next_cleanup_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_daily_occurrence(now, self.cleanup_time())
    }

    /// `HH:MM` rendering for logs.
    pub fn report_time_label(&self) -> String {
        format!("{:02}:{:02}", self.report_time.hour(), self.report_time.minute())
    }

    pub fn cleanup_time_label(&self) -> String {
        let t = self.cleanup_time();
        format!("{:02}:{:02}", t.hour(), t.minute())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            report_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
            cleanup_offset_minutes: DEFAULT_CLEANUP_OFFSET_MINUTES,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Parse `HH:MM` (24h clock).
pub fn parse_report_time(s: &str) -> Result<NaiveTime, DomainError> {
    let invalid = || DomainError::Config(format!("report time must be HH:MM (UTC), got '{}'", s));
    let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.trim().parse().map_err(|_| invalid())?;
    let minute: u32 = m.trim().parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// First instant strictly after `now` whose UTC time of day equals `at`.
pub fn next_daily_occurrence(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}
