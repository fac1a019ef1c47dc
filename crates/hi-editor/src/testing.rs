//! In-memory `Surface` and `Transport` for driving the engine without a
//! browser.

use crate::host::{GeometryPayload, Surface, Transport};
use crate::input::ElementId;
use hi_core::{Affine, Rect};
use std::collections::{HashMap, HashSet};

/// A fake DOM: attributes, inline styles and fixed geometry per element id.
#[derive(Debug, Default)]
pub struct MemorySurface {
    attributes: HashMap<(String, String), String>,
    styles: HashMap<(String, String), String>,
    rects: HashMap<String, Rect>,
    matrices: HashMap<String, Affine>,
    visible: HashSet<String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, element: &str, name: &str, value: &str) -> Self {
        self.attributes
            .insert((element.to_string(), name.to_string()), value.to_string());
        self
    }

    pub fn with_rect(mut self, element: &str, rect: Rect) -> Self {
        self.rects.insert(element.to_string(), rect);
        self
    }

    pub fn with_matrix(mut self, element: &str, matrix: Affine) -> Self {
        self.matrices.insert(element.to_string(), matrix);
        self
    }

    pub fn with_visible(mut self, element: &str) -> Self {
        self.visible.insert(element.to_string());
        self
    }

    pub fn set_rect(&mut self, element: &str, rect: Rect) {
        self.rects.insert(element.to_string(), rect);
    }

    pub fn set_visible(&mut self, element: &str, visible: bool) {
        if visible {
            self.visible.insert(element.to_string());
        } else {
            self.visible.remove(element);
        }
    }

    pub fn attr(&self, element: &str, name: &str) -> Option<&str> {
        self.attributes
            .get(&(element.to_string(), name.to_string()))
            .map(String::as_str)
    }

    pub fn style(&self, element: &str, name: &str) -> Option<&str> {
        self.styles
            .get(&(element.to_string(), name.to_string()))
            .map(String::as_str)
    }
}

impl Surface for MemorySurface {
    fn attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        self.attr(element.as_str(), name).map(str::to_string)
    }

    fn set_attribute(&mut self, element: &ElementId, name: &str, value: &str) {
        self.attributes.insert(
            (element.as_str().to_string(), name.to_string()),
            value.to_string(),
        );
    }

    fn set_style_property(&mut self, element: &ElementId, name: &str, value: &str) {
        self.styles.insert(
            (element.as_str().to_string(), name.to_string()),
            value.to_string(),
        );
    }

    fn bounding_rect(&self, element: &ElementId) -> Option<Rect> {
        self.rects.get(element.as_str()).copied()
    }

    fn screen_matrix(&self, element: &ElementId) -> Option<Affine> {
        self.matrices.get(element.as_str()).copied()
    }

    fn is_visible(&self, element: &ElementId) -> bool {
        self.visible.contains(element.as_str())
    }
}

/// Records every request instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub posts: Vec<(String, GeometryPayload)>,
    pub gets: Vec<String>,
    /// When set, every request is recorded and then reported as failed.
    pub fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn outcome(&self) -> Result<(), String> {
        if self.fail {
            Err("network unreachable".to_string())
        } else {
            Ok(())
        }
    }
}

impl Transport for RecordingTransport {
    fn post(&mut self, url: &str, payload: &GeometryPayload) -> Result<(), String> {
        self.posts.push((url.to_string(), payload.clone()));
        self.outcome()
    }

    fn get(&mut self, url: &str) -> Result<(), String> {
        self.gets.push(url.to_string());
        self.outcome()
    }
}
