//! Record command for counting a single event.

use std::io::Write;

use anyhow::{Context, Result};

use tally_core::Category;
use tally_db::DailyCounterStore;

/// Increments today's total for `category` and prints the new value.
pub fn run<W: Write>(writer: &mut W, store: &DailyCounterStore, category: &Category) -> Result<u64> {
    let total = store
        .increment_today(category)
        .with_context(|| format!("failed to record {category} event"))?;
    writeln!(writer, "{category}: {total}")?;
    Ok(total)
}
