//! Tunable thresholds and page hooks for the gesture engine.
//!
//! Every constant has a named default; the page can override any subset by
//! passing JSON to [`GestureConfig::from_json`].

use serde::Deserialize;

/// Moves for one pointer closer together than this are dropped.
pub const MOVE_FLOOD_MS: f64 = 10.0;
/// Moves smaller than this on both axes are dropped.
pub const MOVE_THRESHOLD_PX: f64 = 2.0;

/// A down/up pair shorter than this may be a click.
pub const CLICK_MAX_MS: f64 = 150.0;
/// A down/up pair that moved less than this may be a click.
pub const CLICK_MAX_PX: f64 = 5.0;
/// How long a real `click` has to arrive before one is synthesized.
pub const SYNTHETIC_CLICK_DELAY_MS: f64 = 50.0;

pub const PERSIST_DEBOUNCE_MS: f64 = 400.0;

/// Wheel notch and `+`/`-` key zoom step (fraction of the current size).
pub const ZOOM_STEP: f64 = 0.10;
/// Pinch distance change (px) that would halve or double the view.
pub const PINCH_ZOOM_FACTOR: f64 = 250.0;
pub const MIN_ZOOM_STEP: f64 = 0.5;
pub const MAX_ZOOM_STEP: f64 = 1.5;

pub const KEY_ROTATE_STEP_DEG: f64 = 10.0;
pub const WHEEL_ROTATE_STEP_DEG: f64 = 3.0;
pub const ROTATE_DAMPING: f64 = 0.5;

pub const ICON_DRAG_THRESHOLD_PX: f64 = 3.0;
pub const ICON_SCALE_PER_PX: f64 = 0.01;
pub const MIN_ICON_SCALE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub move_flood_ms: f64,
    pub move_threshold_px: f64,
    pub click_max_ms: f64,
    pub click_max_px: f64,
    pub synthetic_click_delay_ms: f64,
    pub persist_debounce_ms: f64,

    pub zoom_step: f64,
    pub pinch_zoom_factor: f64,
    pub min_zoom_step: f64,
    pub max_zoom_step: f64,

    pub key_rotate_step_deg: f64,
    pub wheel_rotate_step_deg: f64,
    pub rotate_damping: f64,

    pub icon_drag_threshold_px: f64,
    pub icon_scale_per_px: f64,
    pub min_icon_scale: f64,

    /// Element id of the location-view `<svg>`.
    pub base_svg_id: String,
    /// Element id of the edit panel whose visibility gates view persistence.
    pub view_geometry_panel_id: String,
    /// Attribute holding the server-side id of an icon element.
    pub icon_id_attribute: String,

    pub view_geometry_url: String,
    /// `{id}` is replaced by the icon's server-side id.
    pub icon_geometry_url: String,
    /// `{id}` is replaced by the icon's server-side id.
    pub icon_details_url: String,

    pub log_level: String,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            move_flood_ms: MOVE_FLOOD_MS,
            move_threshold_px: MOVE_THRESHOLD_PX,
            click_max_ms: CLICK_MAX_MS,
            click_max_px: CLICK_MAX_PX,
            synthetic_click_delay_ms: SYNTHETIC_CLICK_DELAY_MS,
            persist_debounce_ms: PERSIST_DEBOUNCE_MS,
            zoom_step: ZOOM_STEP,
            pinch_zoom_factor: PINCH_ZOOM_FACTOR,
            min_zoom_step: MIN_ZOOM_STEP,
            max_zoom_step: MAX_ZOOM_STEP,
            key_rotate_step_deg: KEY_ROTATE_STEP_DEG,
            wheel_rotate_step_deg: WHEEL_ROTATE_STEP_DEG,
            rotate_damping: ROTATE_DAMPING,
            icon_drag_threshold_px: ICON_DRAG_THRESHOLD_PX,
            icon_scale_per_px: ICON_SCALE_PER_PX,
            min_icon_scale: MIN_ICON_SCALE,
            base_svg_id: "hi-location-view-svg".to_string(),
            view_geometry_panel_id: "hi-location-view-geometry".to_string(),
            icon_id_attribute: "data-id".to_string(),
            view_geometry_url: "/location/edit/location-view/geometry".to_string(),
            icon_geometry_url: "/location/edit/item/position/{id}".to_string(),
            icon_details_url: "/location/edit/item/details/{id}".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GestureConfig {
    /// Parse a (possibly partial) JSON config; absent keys keep defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| format!("Config parse error: {e}"))
    }

    pub fn icon_geometry_url_for(&self, id: &str) -> String {
        self.icon_geometry_url.replace("{id}", id)
    }

    pub fn icon_details_url_for(&self, id: &str) -> String {
        self.icon_details_url.replace("{id}", id)
    }
}
