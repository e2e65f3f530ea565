//! Day buckets.
//!
//! "Today" is always derived through a [`Clock`] and rendered with
//! [`day_key`]. Both the lookup and the creation path of a counter go through
//! the same function, so a bucket written at 23:59 and read at 23:59 agree on
//! the key.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDate};

/// Storage format of a day bucket (ISO calendar date, no time component).
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Wall clock in the user's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a date that can be moved by hand.
///
/// Used to simulate day changes in tests and when replaying events.
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub const fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().unwrap_or_else(PoisonError::into_inner) = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Formats a date as its bucket key (e.g. `2024-01-15`).
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parses a bucket key back into a date.
pub fn parse_day_key(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT)
}
