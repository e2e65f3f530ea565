//! Export command for dumping every stored day total.
//!
//! Outputs one JSON object per bucket, oldest day first.

use std::io::Write;

use anyhow::{Context, Result};

use tally_db::DailyCounterStore;

pub fn run<W: Write>(writer: &mut W, store: &DailyCounterStore) -> Result<usize> {
    let totals = store.all_totals().context("failed to read stored totals")?;
    for row in &totals {
        writeln!(writer, "{}", serde_json::to_string(row)?)?;
    }
    Ok(totals.len())
}
