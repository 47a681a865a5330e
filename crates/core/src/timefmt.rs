//! Clock-time conversion and date rendering helpers.
//!
//! Time inputs are edited as 24-hour `HH:MM` while the schedule API stores
//! 12-hour `hh:mm AM/PM` strings.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

const CLOCK_24: &str = "%H:%M";
const CLOCK_12: &str = "%I:%M %p";

/// Days between now and a reservation below which it can no longer be changed.
pub const MODIFY_CUTOFF_DAYS: i64 = 5;

/// A time string that does not match the expected clock format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid {expected} time")]
pub struct TimeFormatError {
    /// Offending input.
    pub input: String,
    /// Human description of the expected format.
    pub expected: &'static str,
}

/// Convert `HH:MM` to `hh:mm AM/PM`, e.g. `13:05` → `01:05 PM`.
pub fn to_12_hour(time: &str) -> Result<String, TimeFormatError> {
    let parsed = NaiveTime::parse_from_str(time.trim(), CLOCK_24).map_err(|_| TimeFormatError {
        input: time.to_string(),
        expected: "24-hour HH:MM",
    })?;
    Ok(parsed.format(CLOCK_12).to_string())
}

/// Convert `hh:mm AM/PM` to `HH:MM`, e.g. `12:30 AM` → `00:30`.
pub fn to_24_hour(time: &str) -> Result<String, TimeFormatError> {
    let parsed = NaiveTime::parse_from_str(time.trim(), CLOCK_12).map_err(|_| TimeFormatError {
        input: time.to_string(),
        expected: "12-hour hh:mm AM/PM",
    })?;
    Ok(parsed.format(CLOCK_24).to_string())
}

/// Accept either clock format and return zero-padded `HH:MM`.
pub fn normalize_24_hour(time: &str) -> Result<String, TimeFormatError> {
    let trimmed = time.trim();
    let upper = trimmed.to_ascii_uppercase();
    if upper.ends_with("AM") || upper.ends_with("PM") {
        return to_24_hour(trimmed);
    }
    let parsed = NaiveTime::parse_from_str(trimmed, CLOCK_24).map_err(|_| TimeFormatError {
        input: time.to_string(),
        expected: "HH:MM or hh:mm AM/PM",
    })?;
    Ok(parsed.format(CLOCK_24).to_string())
}

/// Render a stored calendar date as `YYYY-MM-DD`.
///
/// Dates are submitted as UTC midnight, so the UTC calendar day is the date.
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.date_naive().format("%Y-%m-%d").to_string()
}

/// Render a birth date as `YYYY/MM/DD`.
pub fn format_birth_date(value: &DateTime<Utc>) -> String {
    value.format("%Y/%m/%d").to_string()
}

/// Parse a `YYYY-MM-DD` form value.
pub fn parse_form_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// UTC midnight of `date`, the representation submitted for calendar dates.
pub fn date_timestamp(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Current local calendar date, the reference for date validation.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Edit and cancel are offered only while the reservation is at least five days away.
pub fn can_modify_booking(reservation: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    *reservation - *now >= Duration::days(MODIFY_CUTOFF_DAYS)
}
