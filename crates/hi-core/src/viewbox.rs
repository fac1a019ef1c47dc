//! The SVG `viewBox` of the location view.
//!
//! Panning, zooming and rotating the map all reduce to producing a new
//! `ViewBox` and clamping it to the map's extents.

use crate::geometry::rotated_bounding_box;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `{x, y, width, height}` in SVG user units. Width and height are always
/// positive for a value produced by this module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Build a viewBox, rejecting non-positive (or NaN) dimensions.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        if width > 0.0 && height > 0.0 {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        } else {
            None
        }
    }

    /// Parse the attribute form `"x y w h"` (commas are accepted as
    /// separators too).
    pub fn parse(input: &str) -> Option<Self> {
        let mut values = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f64>().ok());
        let x = values.next()??;
        let y = values.next()??;
        let width = values.next()??;
        let height = values.next()??;
        if values.next().is_some() {
            return None;
        }
        Self::new(x, y, width, height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Multiply width and height by `factor`, keeping the center fixed.
    /// Factors below 1 zoom in.
    pub fn scaled_about_center(&self, factor: f64) -> Self {
        let center = self.center();
        let width = self.width * factor;
        let height = self.height * factor;
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    /// Move the origin, keeping the size.
    pub fn with_origin(&self, x: f64, y: f64) -> Self {
        Self { x, y, ..*self }
    }

    /// Clamp this box so it stays inside `extents` as seen with the map
    /// rotated by `angle_deg`.
    ///
    /// The allowed region is the axis-aligned bounding box of the rotated
    /// extents, which is larger than the extents themselves at any angle
    /// that is not a multiple of 180. Width and height shrink to that region
    /// independently, then the origin is shifted inside it.
    pub fn clamp_within(&self, extents: &ViewBox, angle_deg: f64) -> Self {
        let bounds = rotated_bounding_box(extents.to_rect(), angle_deg);
        let width = self.width.min(bounds.width());
        let height = self.height.min(bounds.height());
        let x = self.x.max(bounds.x0).min(bounds.x1 - width);
        let y = self.y.max(bounds.y0).min(bounds.y1 - height);
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
