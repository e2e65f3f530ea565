//! Today's counters on top of [`Database`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tally_core::{Category, Clock};

use crate::{Database, DayTotal, DbError};

/// Durable per-day, per-category event counters.
///
/// "Today" is read from the clock once per call. All calls are serialized
/// on an internal lock, so concurrent increments of the same bucket never
/// lose updates.
pub struct DailyCounterStore {
    db: Mutex<Database>,
    clock: Box<dyn Clock>,
}

impl DailyCounterStore {
    pub fn new(db: Database, clock: impl Clock + 'static) -> Self {
        Self {
            db: Mutex::new(db),
            clock: Box::new(clock),
        }
    }

    /// Opens (or creates) the store file at `path`.
    pub fn open(path: &Path, clock: impl Clock + 'static) -> Result<Self, DbError> {
        Ok(Self::new(Database::open(path)?, clock))
    }

    pub fn open_in_memory(clock: impl Clock + 'static) -> Result<Self, DbError> {
        Ok(Self::new(Database::open_in_memory()?, clock))
    }

    /// The current day bucket according to the store's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Returns today's total for `category`, or `None` before its first event.
    pub fn today_total(&self, category: &Category) -> Result<Option<u64>, DbError> {
        let today = self.today();
        self.lock().find_day_total(today, category)
    }

    /// Returns the total for `category` on a specific day.
    ///
    /// Lets a caller rendering several totals read the clock once.
    pub fn total_on(&self, date: NaiveDate, category: &Category) -> Result<Option<u64>, DbError> {
        self.lock().find_day_total(date, category)
    }

    /// Records one event of `category` today and returns the new total.
    ///
    /// The total is durable when this returns `Ok`.
    pub fn increment_today(&self, category: &Category) -> Result<u64, DbError> {
        let today = self.today();
        let total = self.lock().increment_day_total(today, category)?;
        tracing::debug!(date = %today, %category, total, "incremented counter");
        Ok(total)
    }

    /// Lists every category counted today.
    pub fn today_totals(&self) -> Result<Vec<DayTotal>, DbError> {
        let today = self.today();
        self.lock().totals_for_day(today)
    }

    /// Lists every stored bucket, including past days.
    pub fn all_totals(&self) -> Result<Vec<DayTotal>, DbError> {
        self.lock().list_day_totals()
    }

    // A panic while holding the lock cannot leave a half-applied increment:
    // the open transaction rolls back when it is dropped.
    fn lock(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
