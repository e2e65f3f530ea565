//! Core domain types for the daily input tally.
//!
//! This crate contains the I/O-free pieces shared by storage and the CLI:
//! - Categories: the names counters are bucketed under (`mouse`, `key`, ...)
//! - Input events: host-reported clicks and key presses and their categories
//! - Day buckets: the clock abstraction and the canonical day key format
//! - Display: the sink that renders updated totals as menu text

pub mod category;
pub mod day;
pub mod display;
pub mod event;

pub use category::{Category, InvalidCategory};
pub use day::{Clock, DAY_KEY_FORMAT, FixedClock, SystemClock, day_key, parse_day_key};
pub use display::{DisplaySink, MenuText};
pub use event::InputEvent;
