//! Status command for showing today's menu text.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use tally_core::{Category, MenuText};
use tally_db::DailyCounterStore;

pub fn run<W: Write>(
    writer: &mut W,
    store: &DailyCounterStore,
    database_path: &Path,
) -> Result<()> {
    let today = store.today();
    let menu = load_menu(store, today);

    writeln!(writer, "Daily tally for {today}")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "{menu}")?;

    Ok(())
}

/// Builds the menu from the stored totals of `date`.
///
/// A total that cannot be read is shown as zero; the failure is logged.
pub fn load_menu(store: &DailyCounterStore, date: NaiveDate) -> MenuText {
    MenuText::from_totals(
        total_or_absent(store, date, &Category::MOUSE),
        total_or_absent(store, date, &Category::KEY),
    )
}

fn total_or_absent(store: &DailyCounterStore, date: NaiveDate, category: &Category) -> Option<u64> {
    match store.total_on(date, category) {
        Ok(total) => total,
        Err(err) => {
            tracing::warn!(%category, kind = ?err.kind(), error = %err, "failed to read today's total");
            None
        }
    }
}
