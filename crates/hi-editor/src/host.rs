//! Seams to the page: the DOM attribute/geometry layer and the
//! fragment-update transport.
//!
//! The engine never touches the DOM directly. The wasm bridge implements
//! these traits over `web_sys`; tests implement them in memory.

use crate::input::ElementId;
use hi_core::{Affine, Rect};
use serde::Serialize;

/// DOM query/attribute layer.
pub trait Surface {
    fn attribute(&self, element: &ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, element: &ElementId, name: &str, value: &str);

    /// Set one inline CSS property (`element.style.setProperty`).
    fn set_style_property(&mut self, element: &ElementId, name: &str, value: &str);

    /// On-screen bounding rectangle in CSS pixels.
    fn bounding_rect(&self, element: &ElementId) -> Option<Rect>;

    /// The element's user-space → screen transform (`getScreenCTM`).
    fn screen_matrix(&self, element: &ElementId) -> Option<Affine>;

    /// Whether the element exists and is rendered.
    fn is_visible(&self, element: &ElementId) -> bool;
}

/// Bodies of the two geometry POSTs. Field names are the server contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeometryPayload {
    ViewGeometry {
        /// `"<x> <y> <w> <h>"`
        svg_view_box_str: String,
        /// Degrees.
        svg_rotate: f64,
    },
    IconGeometry {
        svg_x: f64,
        svg_y: f64,
        svg_scale: f64,
        /// Degrees.
        svg_rotate: f64,
    },
}

/// Fragment-update transport. Requests are fire-and-forget: the page
/// renders whatever comes back, and the engine never waits for it.
pub trait Transport {
    fn post(&mut self, url: &str, payload: &GeometryPayload) -> Result<(), String>;

    fn get(&mut self, url: &str) -> Result<(), String>;
}
