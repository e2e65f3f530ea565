//! Listen command: counts input events streamed on stdin.
//!
//! Each non-empty line is one JSON [`InputEvent`], e.g. `{"type":"left_mouse_down"}`.
//! Events are counted against today's bucket for their category and the
//! updated menu line is printed. An event whose increment fails is dropped
//! for display purposes and listening continues.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use tally_core::{DisplaySink, InputEvent};
use tally_db::{DailyCounterStore, DbError};

use crate::commands::status::load_menu;

/// Outcome of a listen session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenStats {
    pub recorded: usize,
    pub dropped: usize,
}

pub fn run<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    store: &DailyCounterStore,
) -> Result<ListenStats> {
    let mut menu = load_menu(store, store.today());
    let mut stats = ListenStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: InputEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid event on line {}", idx + 1))?;

        match record_event(store, &event, &mut menu) {
            Ok(_) => {
                stats.recorded += 1;
                if let Some(title) = menu.title_for(&event.category()) {
                    writeln!(writer, "{title}")?;
                }
            }
            Err(err) => {
                stats.dropped += 1;
                tracing::warn!(
                    line = idx + 1,
                    kind = ?err.kind(),
                    error = %err,
                    "failed to record event, dropping it"
                );
            }
        }
    }

    Ok(stats)
}

/// Counts one event and pushes the new total to `sink`.
///
/// On failure the sink is left untouched.
pub fn record_event<S: DisplaySink>(
    store: &DailyCounterStore,
    event: &InputEvent,
    sink: &mut S,
) -> Result<u64, DbError> {
    match event {
        InputEvent::LeftMouseDown => tracing::debug!("left mouse click"),
        InputEvent::RightMouseDown => tracing::debug!("right mouse click"),
        InputEvent::KeyDown {
            key_code,
            characters,
        } => tracing::debug!(?key_code, ?characters, "key press"),
    }
    let category = event.category();
    let total = store.increment_today(&category)?;
    sink.update(&category, total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use chrono::NaiveDate;
    use tally_core::{Category, FixedClock, MenuText};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn listen_counts_events_and_prints_menu_lines() {
        let store = DailyCounterStore::open_in_memory(FixedClock::new(day())).unwrap();
        store.increment_today(&Category::KEY).unwrap();

        let input = concat!(
            "{\"type\":\"left_mouse_down\"}\n",
            "\n",
            "{\"type\":\"key_down\",\"key_code\":12,\"characters\":\"q\"}\n",
            "{\"type\":\"right_mouse_down\"}\n",
        );
        let mut output = Vec::new();
        let stats = run(Cursor::new(input), &mut output, &store).unwrap();

        assert_eq!(
            stats,
            ListenStats {
                recorded: 3,
                dropped: 0
            }
        );
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Clicks today: 1\nKey presses today: 2\nClicks today: 2\n"
        );
        assert_eq!(store.today_total(&Category::MOUSE).unwrap(), Some(2));
    }

    #[test]
    fn listen_rejects_malformed_line() {
        let store = DailyCounterStore::open_in_memory(FixedClock::new(day())).unwrap();
        let input = "{\"type\":\"left_mouse_down\"}\nnot json\n";
        let mut output = Vec::new();
        let err = run(Cursor::new(input), &mut output, &store).unwrap_err();
        assert!(err.to_string().contains("invalid event on line 2"));
        assert_eq!(store.today_total(&Category::MOUSE).unwrap(), Some(1));
    }

    #[test]
    fn failed_increment_is_dropped_without_updating_display() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("tally.db");
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "
            CREATE TABLE day_totals (date TEXT NOT NULL, category TEXT NOT NULL, total INTEGER NOT NULL);
            INSERT INTO day_totals VALUES ('2025-06-01', 'key', 1);
            INSERT INTO day_totals VALUES ('2025-06-01', 'key', 2);
            ",
        )
        .unwrap();
        drop(conn);
        let store = DailyCounterStore::open(&db_path, FixedClock::new(day())).unwrap();

        let mut menu = MenuText::from_totals(None, Some(9));
        let key_down = InputEvent::KeyDown {
            key_code: None,
            characters: None,
        };
        assert!(record_event(&store, &key_down, &mut menu).is_err());
        assert_eq!(menu, MenuText::from_totals(None, Some(9)));

        let input = "{\"type\":\"key_down\"}\n{\"type\":\"left_mouse_down\"}\n";
        let mut output = Vec::new();
        let stats = run(Cursor::new(input), &mut output, &store).unwrap();
        assert_eq!(
            stats,
            ListenStats {
                recorded: 1,
                dropped: 1
            }
        );
        assert_eq!(String::from_utf8(output).unwrap(), "Clicks today: 1\n");
    }
}
