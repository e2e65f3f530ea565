//! Rendering of daily totals.

use std::fmt;

use crate::Category;

/// Receiver of updated totals, e.g. a status menu.
pub trait DisplaySink {
    fn update(&mut self, category: &Category, total: u64);
}

/// Text of the status menu: one item for clicks and one for key presses.
///
/// Categories other than `mouse` and `key` have no menu item and are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuText {
    clicks: u64,
    presses: u64,
}

impl MenuText {
    /// Builds the menu from stored totals; absent totals show as zero.
    pub fn from_totals(clicks: Option<u64>, presses: Option<u64>) -> Self {
        Self {
            clicks: clicks.unwrap_or_default(),
            presses: presses.unwrap_or_default(),
        }
    }

    pub fn clicks_title(&self) -> String {
        format!("Clicks today: {}", self.clicks)
    }

    pub fn presses_title(&self) -> String {
        format!("Key presses today: {}", self.presses)
    }

    /// Title of the menu item showing `category`, if it has one.
    pub fn title_for(&self, category: &Category) -> Option<String> {
        if *category == Category::MOUSE {
            Some(self.clicks_title())
        } else if *category == Category::KEY {
            Some(self.presses_title())
        } else {
            None
        }
    }
}

impl DisplaySink for MenuText {
    fn update(&mut self, category: &Category, total: u64) {
        if *category == Category::MOUSE {
            self.clicks = total;
        } else if *category == Category::KEY {
            self.presses = total;
        }
    }
}

impl fmt::Display for MenuText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.clicks_title())?;
        write!(f, "{}", self.presses_title())
    }
}
