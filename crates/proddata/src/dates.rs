//! Date handling for record filtering.
//!
//! Record dates are free-form ISO-like strings as typed into the entry form.
//! They are compared as naive date-times; offsets in RFC 3339 input are
//! normalized to UTC first.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

/// Date-time layouts accepted besides RFC 3339, tried in order.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-like date or date-time string.
///
/// A bare date is midnight of that day. Returns `None` for anything else.
#[must_use]
pub fn parse_date_time(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

/// Move a date-time to 23:59:59 of the same calendar day.
#[must_use]
pub fn end_of_day(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_time(end_of_day_time())
}

fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// An inclusive date range with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest accepted instant.
    pub start: Option<NaiveDateTime>,
    /// Latest accepted instant, already moved to the end of its day.
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    /// Build a range from user input. Blank or missing bounds are unconstrained.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDate`] if a non-blank bound cannot be parsed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?.map(end_of_day),
        })
    }

    /// Check whether neither side is constrained.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Check whether a record date falls inside the range.
    ///
    /// An unbounded range accepts everything, including unparseable dates.
    /// A bounded range never accepts a date it cannot parse.
    #[must_use]
    pub fn contains(&self, date: &str) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(value) = parse_date_time(date) else {
            return false;
        };
        self.start.map_or(true, |start| value >= start) && self.end.map_or(true, |end| value <= end)
    }
}

fn parse_bound(bound: Option<&str>) -> Result<Option<NaiveDateTime>> {
    match bound.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date_time(text)
            .map(Some)
            .ok_or_else(|| Error::invalid_date(text)),
    }
}
