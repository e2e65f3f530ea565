//! Counter categories.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted category name.
const MAX_CATEGORY_LEN: usize = 64;

/// Name of a counted input type, the second half of a bucket key.
///
/// Names are normalized on parse (trimmed, lower-cased) so that `"Mouse"` and
/// `"mouse"` land in the same bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(Cow<'static, str>);

impl Category {
    /// Mouse button presses (left and right).
    pub const MOUSE: Self = Self(Cow::Borrowed("mouse"));
    /// Key presses.
    pub const KEY: Self = Self(Cow::Borrowed("key"));

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Category {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(InvalidCategory::Empty);
        }
        if normalized.len() > MAX_CATEGORY_LEN {
            return Err(InvalidCategory::TooLong(normalized.len()));
        }
        if let Some(ch) = normalized
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-'))
        {
            return Err(InvalidCategory::InvalidChar(ch));
        }
        Ok(Self(Cow::Owned(normalized)))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for category names that cannot be used as bucket keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCategory {
    #[error("category name is empty")]
    Empty,
    #[error("category name is {0} bytes long (max {max})", max = MAX_CATEGORY_LEN)]
    TooLong(usize),
    #[error("category name contains invalid character {0:?}")]
    InvalidChar(char),
}
