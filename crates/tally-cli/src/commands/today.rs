//! Today command for listing every category counted today.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use tally_db::DailyCounterStore;

#[derive(Debug, Serialize)]
struct TodayReport {
    date: NaiveDate,
    totals: BTreeMap<String, u64>,
}

pub fn run<W: Write>(writer: &mut W, store: &DailyCounterStore, json: bool) -> Result<()> {
    let date = store.today();
    let totals = store
        .today_totals()
        .context("failed to read today's totals")?;

    if json {
        let report = TodayReport {
            date,
            totals: totals
                .into_iter()
                .map(|row| (row.category.to_string(), row.total))
                .collect(),
        };
        writeln!(writer, "{}", serde_json::to_string(&report)?)?;
        return Ok(());
    }

    writeln!(writer, "Totals for {date}")?;
    if totals.is_empty() {
        writeln!(writer, "No events recorded today.")?;
        return Ok(());
    }
    for row in totals {
        writeln!(writer, "- {}: {}", row.category, row.total)?;
    }

    Ok(())
}
