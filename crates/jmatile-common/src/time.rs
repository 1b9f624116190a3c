//! Timestamp scheduling for JMA tile requests.
//!
//! A tile URL names two instants: when the underlying data was observed and
//! which time the tile is valid for. Both are 14-digit UTC strings
//! (`YYYYMMDDHHMMSS`), so string order equals time order.
//!
//! The rules operate on the wall clock in JST (UTC+9), the service's fixed
//! local offset. Callers pass the current time explicitly.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// JST offset from UTC in seconds.
pub const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Tile timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Human-readable format for report times.
pub const DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// The fixed UTC+9 offset.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Observation/forecast pair selecting one published tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub observation_timestamp: String,
    pub forecast_timestamp: String,
}

/// Quantize a JST hour to the start of its 3-hour forecast slot.
pub fn slot_hour(hour: u32) -> u32 {
    hour - hour % 3
}

/// Timestamps for the 3-hourly weather forecast (`wdist`) tiles.
///
/// The observation anchor is the latest model run published before the slot:
/// slot ≤ 6 uses the previous day 08:00 UTC, slot ≤ 12 the previous day
/// 20:00 UTC, slot ≤ 18 the same day 02:00 UTC, later slots the same day
/// 08:00 UTC. Dates are taken from the JST wall clock.
pub fn resolve_forecast_schedule<Tz: TimeZone>(now: &DateTime<Tz>) -> ScheduleResult {
    let local = to_jst_naive(now);
    let date = local.date();
    let slot = slot_hour(local.hour());

    let (observation_date, observation_hour) = match slot {
        0..=6 => (date - Duration::days(1), 8),
        7..=12 => (date - Duration::days(1), 20),
        13..=18 => (date, 2),
        _ => (date, 8),
    };
    let observation_timestamp = format!(
        "{}{:02}0000",
        observation_date.format("%Y%m%d"),
        observation_hour
    );

    let slot_start = date.and_time(NaiveTime::default()) + Duration::hours(slot as i64);
    let forecast_timestamp = format_timestamp(&jst_to_utc(slot_start));

    ScheduleResult {
        observation_timestamp,
        forecast_timestamp,
    }
}

/// Timestamps for the 5-minute rainfall nowcast (`nowc`) tiles.
///
/// Nowcasts carry no separate observation anchor, so both timestamps are the
/// current time floored to 5 minutes, in UTC.
pub fn resolve_rainfall_schedule<Tz: TimeZone>(now: &DateTime<Tz>) -> ScheduleResult {
    let local = to_jst_naive(now);
    let minute = local.minute() - local.minute() % 5;
    let rounded = local.date().and_time(NaiveTime::default())
        + Duration::hours(local.hour() as i64)
        + Duration::minutes(minute as i64);
    let timestamp = format_timestamp(&jst_to_utc(rounded));

    ScheduleResult {
        observation_timestamp: timestamp.clone(),
        forecast_timestamp: timestamp,
    }
}

/// Format a JST instant for reports.
pub fn format_local<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    to_jst_naive(now).format(DISPLAY_FORMAT).to_string()
}

/// Format the UTC equivalent of an instant for reports.
pub fn format_utc<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    now.naive_utc().format(DISPLAY_FORMAT).to_string()
}

fn to_jst_naive<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDateTime {
    now.with_timezone(&jst()).naive_local()
}

fn jst_to_utc(local: NaiveDateTime) -> NaiveDateTime {
    local - Duration::seconds(JST_OFFSET_SECS as i64)
}

fn format_timestamp(utc: &NaiveDateTime) -> String {
    utc.format(TIMESTAMP_FORMAT).to_string()
}
