//! Calendar-date parsing and display formats.
//!
//! Event dates are pure calendar dates. Nothing here touches a time zone, so a
//! date stored as `2020-06-15` renders as June 15th no matter where the server
//! or the reader is.

use chrono::{Datelike, NaiveDate};

/// Wire format of `event_date` (`YYYY-MM-DD`).
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an `event_date` as submitted by a form or returned by the row store.
pub fn parse_event_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), EVENT_DATE_FORMAT)
}

/// Long form used on the detail screen: `2020年6月15日`.
pub fn format_long(date: NaiveDate) -> String {
    format!("{}年{}月{}日", date.year(), date.month(), date.day())
}

/// Short numeric form used on the timeline list: `2020.06.15`.
pub fn format_short(date: NaiveDate) -> String {
    format!("{:04}.{:02}.{:02}", date.year(), date.month(), date.day())
}
