//! Storage layer for the daily input tally.
//!
//! Provides persistence for per-day, per-category counters using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! [`DailyCounterStore`] puts it behind a `Mutex` so that every read-modify-write
//! runs as one serialized unit; share the store, not the database.
//!
//! # Schema
//!
//! A single `day_totals` table keyed by `(date, category)`:
//! - `date`: the day bucket as TEXT in `YYYY-MM-DD` form (see [`tally_core::day_key`])
//! - `category`: normalized category name (see [`tally_core::Category`])
//! - `total`: non-negative INTEGER
//!
//! Lookups still count matching rows. A file created by an older or foreign
//! writer may lack the primary key, and two rows for one bucket are reported
//! as [`DbError::DuplicateBucket`] rather than picking one.

mod store;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;
use tally_core::{Category, InvalidCategory, day_key, parse_day_key};
use thiserror::Error;

pub use store::DailyCounterStore;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The directory holding the database file could not be created.
    #[error("failed to create storage directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// More than one record exists for a single bucket.
    #[error("found {count} records for {category} on {date}, expected at most one")]
    DuplicateBucket {
        date: String,
        category: String,
        count: usize,
    },
    /// A stored total is negative or too large to increment.
    #[error("corrupt total {total} for {category} on {date}")]
    CorruptTotal {
        date: String,
        category: String,
        total: i64,
    },
    /// A stored date is not a valid day key.
    #[error("invalid stored date {date:?}")]
    InvalidDate {
        date: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored category name is not valid.
    #[error("invalid stored category {category:?}")]
    InvalidCategory {
        category: String,
        #[source]
        source: InvalidCategory,
    },
}

/// Coarse classification of [`DbError`] for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backing store cannot be read or written.
    StorageUnavailable,
    /// The store holds more than one record for a bucket.
    InvariantViolation,
}

impl DbError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateBucket { .. } => ErrorKind::InvariantViolation,
            Self::Sqlite(_)
            | Self::CreateDir { .. }
            | Self::CorruptTotal { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidCategory { .. } => ErrorKind::StorageUnavailable,
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// The counter for one `(date, category)` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub category: Category,
    pub total: u64,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// Missing parent directories are created first. The database schema is
    /// automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA synchronous = FULL;")?;
        self.conn.execute_batch(
            "
            -- date: day bucket, 'YYYY-MM-DD'
            -- category: normalized category name (e.g. 'mouse', 'key')
            CREATE TABLE IF NOT EXISTS day_totals (
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                total INTEGER NOT NULL CHECK (total >= 0),
                PRIMARY KEY (date, category)
            );
            ",
        )?;
        Ok(())
    }

    /// Looks up the bucket for `category` on `date`.
    pub fn find_day_total(
        &self,
        date: NaiveDate,
        category: &Category,
    ) -> Result<Option<u64>, DbError> {
        find_total(&self.conn, &day_key(date), category)
    }

    /// Adds one to the bucket for `category` on `date`, creating it at 1.
    ///
    /// The lookup and the write share one immediate transaction; the new
    /// total is returned only after the commit succeeds.
    pub fn increment_day_total(
        &mut self,
        date: NaiveDate,
        category: &Category,
    ) -> Result<u64, DbError> {
        let key = day_key(date);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let total = match find_total(&tx, &key, category)? {
            Some(current) => {
                let next = current + 1;
                let stored = i64::try_from(next).map_err(|_| DbError::CorruptTotal {
                    date: key.clone(),
                    category: category.to_string(),
                    total: i64::MAX,
                })?;
                tx.execute(
                    "UPDATE day_totals SET total = ? WHERE date = ? AND category = ?",
                    params![stored, key, category.as_str()],
                )?;
                next
            }
            None => {
                tx.execute(
                    "INSERT INTO day_totals (date, category, total) VALUES (?, ?, 1)",
                    params![key, category.as_str()],
                )?;
                1
            }
        };
        tx.commit()?;
        Ok(total)
    }

    /// Lists every bucket for one day, ordered by category.
    ///
    /// Fails with [`DbError::DuplicateBucket`] if any bucket has more than one row.
    pub fn totals_for_day(&self, date: NaiveDate) -> Result<Vec<DayTotal>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT date, category, total
            FROM day_totals
            WHERE date = ?
            ORDER BY category ASC
            ",
        )?;
        let rows = stmt.query_map([day_key(date)], raw_row)?;
        collect_day_totals(rows)
    }

    /// Lists all buckets ordered by date then category.
    ///
    /// Fails with [`DbError::DuplicateBucket`] if any bucket has more than one row.
    pub fn list_day_totals(&self) -> Result<Vec<DayTotal>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT date, category, total
            FROM day_totals
            ORDER BY date ASC, category ASC
            ",
        )?;
        let rows = stmt.query_map([], raw_row)?;
        collect_day_totals(rows)
    }
}

/// Finds the total for a bucket, rejecting duplicates.
fn find_total(conn: &Connection, key: &str, category: &Category) -> Result<Option<u64>, DbError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM day_totals WHERE date = ? AND category = ?",
        params![key, category.as_str()],
        |row| row.get(0),
    )?;
    if count > 1 {
        return Err(DbError::DuplicateBucket {
            date: key.to_string(),
            category: category.to_string(),
            count: usize::try_from(count).unwrap_or(usize::MAX),
        });
    }
    let total: Option<i64> = conn
        .query_row(
            "SELECT total FROM day_totals WHERE date = ? AND category = ?",
            params![key, category.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    total
        .map(|total| checked_total(key, category.as_str(), total))
        .transpose()
}

fn checked_total(date: &str, category: &str, total: i64) -> Result<u64, DbError> {
    u64::try_from(total).map_err(|_| DbError::CorruptTotal {
        date: date.to_string(),
        category: category.to_string(),
        total,
    })
}

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn collect_day_totals<I>(rows: I) -> Result<Vec<DayTotal>, DbError>
where
    I: Iterator<Item = rusqlite::Result<(String, String, i64)>>,
{
    let mut totals = Vec::new();
    for row in rows {
        let (date, category, total) = row?;
        let total = checked_total(&date, &category, total)?;
        let parsed_date =
            parse_day_key(&date).map_err(|source| DbError::InvalidDate { date, source })?;
        let parsed_category = category
            .parse()
            .map_err(|source| DbError::InvalidCategory { category, source })?;
        totals.push(DayTotal {
            date: parsed_date,
            category: parsed_category,
            total,
        });
    }
    // Raw names that differ only in case normalize to the same category.
    totals.sort_by(|a, b| (a.date, &a.category).cmp(&(b.date, &b.category)));
    if let Some(dup) = totals
        .chunk_by(|a, b| a.date == b.date && a.category == b.category)
        .find(|bucket| bucket.len() > 1)
    {
        return Err(DbError::DuplicateBucket {
            date: day_key(dup[0].date),
            category: dup[0].category.to_string(),
            count: dup.len(),
        });
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn category(name: &str) -> Category {
        name.parse().unwrap()
    }

    /// Replaces the table with one lacking the primary key, as an older
    /// writer might have left it.
    fn downgrade_schema(db: &Database) {
        db.conn
            .execute_batch(
                "
                DROP TABLE day_totals;
                CREATE TABLE day_totals (
                    date TEXT NOT NULL,
                    category TEXT NOT NULL,
                    total INTEGER NOT NULL
                );
                ",
            )
            .unwrap();
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert!(db.list_day_totals().unwrap().is_empty());
    }

    #[test]
    fn schema_has_composite_primary_key() {
        let db = Database::open_in_memory().unwrap();
        let mut stmt = db.conn.prepare("PRAGMA table_info(day_totals)").unwrap();
        let columns: Vec<(String, i64)> = stmt
            .query_map([], |row| Ok((row.get(1)?, row.get(5)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            columns,
            vec![
                ("date".to_string(), 1),
                ("category".to_string(), 2),
                ("total".to_string(), 0),
            ]
        );
    }

    #[test]
    fn init_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.init().expect("second init");
    }

    #[test]
    fn increment_creates_then_updates_bucket() {
        let mut db = Database::open_in_memory().unwrap();
        let day = date(2025, 1, 1);
        assert_eq!(db.find_day_total(day, &Category::MOUSE).unwrap(), None);

        assert_eq!(db.increment_day_total(day, &Category::MOUSE).unwrap(), 1);
        assert_eq!(db.increment_day_total(day, &Category::MOUSE).unwrap(), 2);
        assert_eq!(db.find_day_total(day, &Category::MOUSE).unwrap(), Some(2));

        let rows: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM day_totals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn stored_dates_use_day_key_format() {
        let mut db = Database::open_in_memory().unwrap();
        db.increment_day_total(date(2025, 3, 7), &Category::KEY)
            .unwrap();
        let stored: String = db
            .conn
            .query_row("SELECT date FROM day_totals", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "2025-03-07");
    }

    #[test]
    fn totals_for_day_excludes_other_days() {
        let mut db = Database::open_in_memory().unwrap();
        let d1 = date(2025, 1, 1);
        let d2 = date(2025, 1, 2);
        db.increment_day_total(d1, &Category::MOUSE).unwrap();
        db.increment_day_total(d2, &Category::MOUSE).unwrap();
        db.increment_day_total(d2, &Category::KEY).unwrap();
        db.increment_day_total(d2, &Category::KEY).unwrap();

        let totals = db.totals_for_day(d2).unwrap();
        assert_eq!(
            totals,
            vec![
                DayTotal {
                    date: d2,
                    category: Category::KEY,
                    total: 2
                },
                DayTotal {
                    date: d2,
                    category: Category::MOUSE,
                    total: 1
                },
            ]
        );
        assert_eq!(db.list_day_totals().unwrap().len(), 3);
    }

    #[test]
    fn duplicate_bucket_is_reported_not_summed() {
        let mut db = Database::open_in_memory().unwrap();
        downgrade_schema(&db);
        db.conn
            .execute_batch(
                "
                INSERT INTO day_totals (date, category, total) VALUES ('2025-01-01', 'key', 3);
                INSERT INTO day_totals (date, category, total) VALUES ('2025-01-01', 'key', 5);
                ",
            )
            .unwrap();

        let day = date(2025, 1, 1);
        let err = db.find_day_total(day, &Category::KEY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(matches!(err, DbError::DuplicateBucket { count: 2, .. }));

        let err = db.increment_day_total(day, &Category::KEY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);

        let totals: Vec<i64> = db
            .conn
            .prepare("SELECT total FROM day_totals ORDER BY total")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(totals, vec![3, 5]);

        assert_eq!(db.find_day_total(day, &Category::MOUSE).unwrap(), None);
    }

    #[test]
    fn listings_reject_duplicate_bucket() {
        let mut db = Database::open_in_memory().unwrap();
        downgrade_schema(&db);
        db.conn
            .execute_batch(
                "
                INSERT INTO day_totals (date, category, total) VALUES ('2025-06-01', 'key', 3);
                INSERT INTO day_totals (date, category, total) VALUES ('2025-06-01', 'mouse', 1);
                INSERT INTO day_totals (date, category, total) VALUES ('2025-06-01', 'key', 5);
                ",
            )
            .unwrap();

        let err = db.totals_for_day(date(2025, 6, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(matches!(
            err,
            DbError::DuplicateBucket { ref category, count: 2, .. } if category == "key"
        ));

        let err = db.list_day_totals().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);

        // Other days are still listed.
        db.increment_day_total(date(2025, 6, 2), &Category::KEY)
            .unwrap();
        assert_eq!(db.totals_for_day(date(2025, 6, 2)).unwrap().len(), 1);
    }

    #[test]
    fn listings_treat_case_variants_as_one_bucket() {
        let db = Database::open_in_memory().unwrap();
        downgrade_schema(&db);
        db.conn
            .execute_batch(
                "
                INSERT INTO day_totals (date, category, total) VALUES ('2025-06-01', 'Key', 3);
                INSERT INTO day_totals (date, category, total) VALUES ('2025-06-01', 'Mouse', 1);
                INSERT INTO day_totals (date, category, total) VALUES ('2025-06-01', 'key', 5);
                ",
            )
            .unwrap();

        let err = db.list_day_totals().unwrap_err();
        assert!(matches!(err, DbError::DuplicateBucket { count: 2, .. }));
    }

    #[test]
    fn negative_total_is_corruption() {
        let db = Database::open_in_memory().unwrap();
        downgrade_schema(&db);
        db.conn
            .execute(
                "INSERT INTO day_totals (date, category, total) VALUES ('2025-01-01', 'mouse', -4)",
                [],
            )
            .unwrap();

        let err = db
            .find_day_total(date(2025, 1, 1), &Category::MOUSE)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        assert!(matches!(err, DbError::CorruptTotal { total: -4, .. }));
    }

    #[test]
    fn malformed_stored_rows_fail_listing() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO day_totals (date, category, total) VALUES ('01/02/2025', 'mouse', 1)",
                [],
            )
            .unwrap();
        let err = db.list_day_totals().unwrap_err();
        assert!(matches!(err, DbError::InvalidDate { .. }));
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested/dir/tally.db");
        let mut db = Database::open(&path).expect("open nested path");
        db.increment_day_total(date(2025, 1, 1), &category("scroll"))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn open_fails_when_directory_cannot_be_created() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let Err(err) = Database::open(&blocker.join("sub/tally.db")) else {
            panic!("expected directory creation to fail");
        };
        assert!(matches!(err, DbError::CreateDir { .. }));
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }

    #[test]
    fn open_rejects_corrupt_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tally.db");
        std::fs::write(&path, "this is not a sqlite database\n".repeat(64)).unwrap();

        let Err(err) = Database::open(&path) else {
            panic!("expected corrupt file to be rejected");
        };
        assert!(matches!(err, DbError::Sqlite(_)));
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }
}
