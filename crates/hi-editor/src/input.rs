//! Input abstraction layer.
//!
//! Normalizes browser pointer, wheel, click and keyboard events into plain
//! values the tracker and controllers consume. The host resolves the DOM
//! questions ("is the target inside an icon?", "inside a modal?") once, when
//! it builds the [`TargetInfo`].

use hi_core::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a DOM element (its `id` attribute).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Pointer device class (`PointerEvent.pointerType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    /// Map `PointerEvent.pointerType`. Unknown types behave like a mouse.
    pub fn from_dom(pointer_type: &str) -> Self {
        match pointer_type {
            "touch" => Self::Touch,
            "pen" => Self::Pen,
            _ => Self::Mouse,
        }
    }
}

/// `MouseEvent.buttons` bit for the primary button.
pub const PRIMARY_BUTTON: u16 = 1;

/// What the DOM knows about an event's target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetInfo {
    /// The target element itself, when it has an id.
    pub element: Option<ElementId>,
    /// Closest ancestor-or-self tagged as an icon.
    pub icon: Option<ElementId>,
    /// Target is an `<input>` or `<textarea>`.
    pub is_text_input: bool,
    /// Target is inside a modal dialog.
    pub in_modal: bool,
}

impl TargetInfo {
    /// Keyboard and click events on these targets belong to the form or
    /// dialog, not the map.
    pub fn excludes_shortcuts(&self) -> bool {
        self.is_text_input || self.in_modal
    }
}

/// A low-level pointer down/move/up/cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInput {
    /// Unique per physical contact for its down→up lifetime.
    pub pointer_id: i32,
    pub kind: PointerKind,
    /// `MouseEvent.buttons` bitmask.
    pub buttons: u16,
    /// Screen (client) coordinates in CSS pixels.
    pub x: f64,
    pub y: f64,
    pub time_ms: f64,
    pub target: TargetInfo,
}

impl PointerInput {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Touch and pen always count; a mouse only with the primary button held.
    pub fn is_primary_interaction(&self) -> bool {
        match self.kind {
            PointerKind::Touch | PointerKind::Pen => true,
            PointerKind::Mouse => self.buttons & PRIMARY_BUTTON != 0,
        }
    }
}

/// A wheel notch. Positive `delta_y` scrolls down (zoom out).
#[derive(Debug, Clone, PartialEq)]
pub struct WheelInput {
    pub x: f64,
    pub y: f64,
    pub delta_y: f64,
    pub time_ms: f64,
}

impl WheelInput {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A click, either from the browser or synthesized by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickInput {
    pub x: f64,
    pub y: f64,
    pub time_ms: f64,
    pub target: TargetInfo,
    /// Set when the tracker generated this click after a trackpad swallowed
    /// the native one.
    pub synthetic: bool,
}

impl ClickInput {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A key press (`KeyboardEvent.key` plus modifiers).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub target: TargetInfo,
}

impl KeyInput {
    /// An unmodified key press on a neutral target.
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
            target: TargetInfo::default(),
        }
    }
}
