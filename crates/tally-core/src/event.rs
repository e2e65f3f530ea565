//! Input events reported by the host and the categories they count toward.

use serde::{Deserialize, Serialize};

use crate::Category;

/// A global input event as delivered by the operating system hook.
///
/// Serialized as a JSON object tagged by `type`, e.g.
/// `{"type":"key_down","key_code":12,"characters":"q"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    LeftMouseDown,
    RightMouseDown,
    KeyDown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key_code: Option<u16>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        characters: Option<String>,
    },
}

impl InputEvent {
    /// Category whose counter this event increments.
    pub const fn category(&self) -> Category {
        match self {
            Self::LeftMouseDown | Self::RightMouseDown => Category::MOUSE,
            Self::KeyDown { .. } => Category::KEY,
        }
    }
}
