//! Year grouping for the timeline screen.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::event::Event;

/// Anything that sits on the timeline at a calendar date.
pub trait Dated {
    fn event_date(&self) -> NaiveDate;
}

impl Dated for Event {
    fn event_date(&self) -> NaiveDate {
        self.event_date
    }
}

impl<T: Dated> Dated for &T {
    fn event_date(&self) -> NaiveDate {
        (*self).event_date()
    }
}

/// One year's bucket, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGroup<T> {
    pub year: i32,
    pub events: Vec<T>,
}

/// Partition events by the year of their `event_date`.
///
/// Each bucket keeps the relative order of the input; nothing is re-sorted inside a
/// bucket. The upstream query already orders by date descending.
pub fn group_by_year<T: Dated>(events: impl IntoIterator<Item = T>) -> BTreeMap<i32, Vec<T>> {
    let mut groups: BTreeMap<i32, Vec<T>> = BTreeMap::new();
    for event in events {
        groups
            .entry(event.event_date().year())
            .or_default()
            .push(event);
    }
    groups
}

/// Same buckets as [`group_by_year`], most recent year first.
pub fn group_by_year_desc<T: Dated>(events: impl IntoIterator<Item = T>) -> Vec<YearGroup<T>> {
    group_by_year(events)
        .into_iter()
        .rev()
        .map(|(year, events)| YearGroup { year, events })
        .collect()
}
