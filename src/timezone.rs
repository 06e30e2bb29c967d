//! Calendar-date conversions for user timezones.
//!
//! Streaks and budget months are defined in terms of calendar days in the
//! user's local timezone, so "today" must be derived from an explicit
//! reference instant rather than the server clock's date. Everything
//! downstream of these functions works on plain [Date] values.

use std::ops::RangeInclusive;

use time::{Date, Month, OffsetDateTime};
use time_tz::{Offset, TimeZone, timezones};

use crate::Error;

/// The timezone assumed for users who have not configured one.
pub const FALLBACK_TIMEZONE: &str = "America/Sao_Paulo";

/// Convert a reference instant to the calendar date in `canonical_timezone`,
/// e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the timezone name is unknown.
pub fn local_date(canonical_timezone: &str, instant: OffsetDateTime) -> Result<Date, Error> {
    let timezone = timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;
    let offset = timezone.get_offset_utc(&instant).to_utc();

    Ok(instant.to_offset(offset).date())
}

/// Today's and yesterday's calendar dates in `canonical_timezone` at the
/// reference `instant`.
pub fn today_and_yesterday(
    canonical_timezone: &str,
    instant: OffsetDateTime,
) -> Result<(Date, Date), Error> {
    let today = local_date(canonical_timezone, instant)?;
    let yesterday = today
        .previous_day()
        .ok_or_else(|| Error::InvalidDate(format!("no day before {today}")))?;

    Ok((today, yesterday))
}

/// Check that a timezone name is a canonical IANA name, e.g. "Etc/UTC".
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the timezone name is unknown.
pub fn validate_timezone(canonical_timezone: &str) -> Result<(), Error> {
    match timezones::get_by_name(canonical_timezone) {
        Some(_) => Ok(()),
        None => Err(Error::InvalidTimezone(canonical_timezone.to_owned())),
    }
}

/// The `YYYY-MM` key of the month containing `date`.
pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// The `YYYY-MM` key of the current month in `canonical_timezone`.
pub fn current_month(
    canonical_timezone: &str,
    instant: OffsetDateTime,
) -> Result<String, Error> {
    local_date(canonical_timezone, instant).map(month_key)
}

/// The `YYYY-MM` key of the month before the current one in
/// `canonical_timezone`.
pub fn previous_month(
    canonical_timezone: &str,
    instant: OffsetDateTime,
) -> Result<String, Error> {
    let today = local_date(canonical_timezone, instant)?;
    let first_of_month = today
        .replace_day(1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;
    let end_of_previous = first_of_month
        .previous_day()
        .ok_or_else(|| Error::InvalidDate(format!("no month before {today}")))?;

    Ok(month_key(end_of_previous))
}

/// The inclusive date range covered by a `YYYY-MM` month key.
///
/// # Errors
/// Returns [Error::InvalidMonth] if `month` is not a valid `YYYY-MM` string.
pub fn month_range(month: &str) -> Result<RangeInclusive<Date>, Error> {
    let invalid = || Error::InvalidMonth(month.to_owned());

    let (year_text, month_text) = month.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year_text.parse().map_err(|_| invalid())?;
    let month_number: u8 = month_text.parse().map_err(|_| invalid())?;
    let month_of_year = Month::try_from(month_number).map_err(|_| invalid())?;

    let start = Date::from_calendar_date(year, month_of_year, 1).map_err(|_| invalid())?;
    let next_month_start = match month_of_year.next() {
        Month::January => Date::from_calendar_date(year + 1, Month::January, 1),
        next => Date::from_calendar_date(year, next, 1),
    }
    .map_err(|_| invalid())?;
    let end = next_month_start.previous_day().ok_or_else(invalid)?;

    Ok(start..=end)
}
