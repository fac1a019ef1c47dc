//! Pan, zoom and rotate of the location-view map.
//!
//! The map is the base `<svg>`: panning and zooming rewrite its `viewBox`,
//! rotating rewrites the `rotate(...)` part of its `transform` attribute and
//! mirrors it into a CSS `transform: rotate(...)` (some browser/GPU
//! combinations render only one of the two consistently).
//!
//! While a gesture runs, a [`ViewState`] captured at its start is the source
//! of truth; every frame is computed from it and written back to the DOM.
//! Every result is clamped to the map's extents, taking rotation into
//! account. Committed changes are persisted through a debounce so that a
//! burst of wheel notches costs one request.

use crate::config::GestureConfig;
use crate::dispatch::{Gesture, GestureHandler, HandlerContext};
use crate::host::GeometryPayload;
use crate::input::{ElementId, KeyInput, WheelInput};
use crate::pointer::{DoublePointerEvent, SinglePointerEvent};
use crate::selection::SelectionOrigin;
use crate::shortcuts::{GestureMode, ShortcutAction, ShortcutMap};
use crate::timer::Debounce;
use hi_core::{
    Point, Rotate, TransformState, Vec2, ViewBox, angle, distance, normalize_angle,
    parse_transform_with, pixels_per_svg_unit, rotate_vector, wrap_angle_delta,
};

/// Attribute holding the map's full extents. Falls back to the first
/// viewBox seen when absent.
pub const EXTENTS_ATTRIBUTE: &str = "data-extents";

/// The map's visible window and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub view_box: ViewBox,
    /// Degrees in [0, 360).
    pub rotate: f64,
}

pub struct LocationViewController {
    svg: ElementId,
    geometry_panel: ElementId,
    extents: Option<ViewBox>,
    selected: bool,
    mode: GestureMode,
    /// State when the current Scale/Rotate mode was entered (Escape target).
    mode_origin: Option<ViewState>,
    /// State when the current pointer gesture started.
    gesture_origin: Option<ViewState>,
    gesture_changed: bool,
    /// Key or wheel steps taken since the current mode was entered.
    mode_changed: bool,
    /// Latest state written to the DOM.
    view: Option<ViewState>,
    /// Swallow the click the browser sends after a drag, up to this time.
    ignore_click_until: Option<f64>,
    persist: Debounce,
}

impl LocationViewController {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            svg: ElementId::new(config.base_svg_id.clone()),
            geometry_panel: ElementId::new(config.view_geometry_panel_id.clone()),
            extents: None,
            selected: false,
            mode: GestureMode::Move,
            mode_origin: None,
            gesture_origin: None,
            gesture_changed: false,
            mode_changed: false,
            view: None,
            ignore_click_until: None,
            persist: Debounce::new(config.persist_debounce_ms),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn is_persist_pending(&self) -> bool {
        self.persist.is_armed()
    }

    // ─── DOM state ───────────────────────────────────────────────────────

    /// Read the current view from the DOM.
    fn load_view(&mut self, cx: &HandlerContext<'_>) -> Option<ViewState> {
        let view_box = cx
            .surface
            .attribute(&self.svg, "viewBox")
            .and_then(|attr| ViewBox::parse(&attr))?;
        let transform = cx.surface.attribute(&self.svg, "transform");
        let angle = parse_transform_with(transform.as_deref(), &TransformState::IDENTITY)
            .rotate
            .angle;
        let rotate = if angle.is_finite() {
            normalize_angle(angle)
        } else {
            0.0
        };

        if self.extents.is_none() {
            let extents = cx
                .surface
                .attribute(&self.svg, EXTENTS_ATTRIBUTE)
                .and_then(|attr| ViewBox::parse(&attr));
            if extents.is_none() {
                log::warn!(
                    "#{} has no usable {EXTENTS_ATTRIBUTE}, clamping to viewBox {view_box}",
                    self.svg
                );
            }
            self.extents = extents.or(Some(view_box));
        }

        let view = ViewState { view_box, rotate };
        self.view = Some(view);
        Some(view)
    }

    /// Clamp, normalize and write a new view. Returns what was written.
    fn apply(&mut self, cx: &mut HandlerContext<'_>, mut view: ViewState) -> ViewState {
        view.rotate = normalize_angle(view.rotate);
        if let Some(extents) = self.extents {
            view.view_box = view.view_box.clamp_within(&extents, view.rotate);
        }
        log::trace!("view {} rotate {}", view.view_box, view.rotate);

        cx.surface
            .set_attribute(&self.svg, "viewBox", &view.view_box.to_string());

        let existing = cx.surface.attribute(&self.svg, "transform");
        let mut transform =
            parse_transform_with(existing.as_deref(), &TransformState::IDENTITY);
        let center = view.view_box.center();
        transform.rotate = Rotate {
            angle: view.rotate,
            cx: center.x,
            cy: center.y,
        };
        cx.surface
            .set_attribute(&self.svg, "transform", &transform.compose());
        cx.surface.set_style_property(
            &self.svg,
            "transform",
            &format!("rotate({}deg)", view.rotate),
        );

        self.view = Some(view);
        view
    }

    fn screen_center(&self, cx: &HandlerContext<'_>) -> Option<Point> {
        cx.surface.bounding_rect(&self.svg).map(|rect| rect.center())
    }

    fn contains_screen_point(&self, cx: &HandlerContext<'_>, point: Point) -> bool {
        cx.surface
            .bounding_rect(&self.svg)
            .is_some_and(|rect| rect.contains(point))
    }

    fn clamp_zoom_step(cx: &HandlerContext<'_>, factor: f64) -> f64 {
        factor.clamp(cx.config.min_zoom_step, cx.config.max_zoom_step)
    }

    // ─── Operations ──────────────────────────────────────────────────────

    /// Resize the view about its center. Factors below 1 zoom in.
    fn zoom(&mut self, cx: &mut HandlerContext<'_>, view: ViewState, factor: f64) -> ViewState {
        let view_box = view.view_box.scaled_about_center(factor);
        self.apply(cx, ViewState { view_box, ..view })
    }

    fn rotate_by(&mut self, cx: &mut HandlerContext<'_>, view: ViewState, degrees: f64) -> ViewState {
        self.apply(
            cx,
            ViewState {
                rotate: view.rotate + degrees,
                ..view
            },
        )
    }

    /// Pan by the pointer's total movement since the gesture started.
    fn pan(&mut self, cx: &mut HandlerContext<'_>, ev: &SinglePointerEvent) -> bool {
        let Some(origin) = self.gesture_origin else {
            return false;
        };
        let Some(matrix) = cx.surface.screen_matrix(&self.svg) else {
            return false;
        };
        let ppu = pixels_per_svg_unit(matrix);
        if ppu.scale_x <= 0.0 || ppu.scale_y <= 0.0 {
            return false;
        }
        let screen_delta = Vec2::new(
            ev.delta_x_start() / ppu.scale_x,
            ev.delta_y_start() / ppu.scale_y,
        );
        // Pan in the map's own unrotated frame
        let delta = rotate_vector(screen_delta, -origin.rotate);
        let view_box = origin
            .view_box
            .with_origin(origin.view_box.x - delta.x, origin.view_box.y - delta.y);
        self.apply(
            cx,
            ViewState {
                view_box,
                rotate: origin.rotate,
            },
        );
        true
    }

    /// Scale mode: moving away from the map's center zooms in.
    fn radial_zoom(&mut self, cx: &mut HandlerContext<'_>, ev: &SinglePointerEvent) -> bool {
        let (Some(view), Some(center)) = (self.view, self.screen_center(cx)) else {
            return false;
        };
        let previous = distance(center, ev.previous.point());
        let last = distance(center, ev.last.point());
        if previous <= 0.0 || last <= 0.0 {
            return true;
        }
        let factor = Self::clamp_zoom_step(cx, previous / last);
        self.zoom(cx, view, factor);
        true
    }

    /// Rotate mode: turning around the map's center rotates it, damped.
    fn radial_rotate(&mut self, cx: &mut HandlerContext<'_>, ev: &SinglePointerEvent) -> bool {
        let (Some(view), Some(center)) = (self.view, self.screen_center(cx)) else {
            return false;
        };
        let delta = wrap_angle_delta(angle(center, ev.last.point()) - angle(center, ev.previous.point()));
        self.rotate_by(cx, view, delta * cx.config.rotate_damping);
        true
    }

    /// Pinch and twist, both incremental against the previous frame.
    fn pinch(&mut self, cx: &mut HandlerContext<'_>, ev: &DoublePointerEvent) -> bool {
        let Some(view) = self.view else {
            return false;
        };
        let factor = Self::clamp_zoom_step(
            cx,
            1.0 - ev.delta_distance_previous() / cx.config.pinch_zoom_factor,
        );
        let twist = ev.delta_angle_previous() * cx.config.rotate_damping;
        let view_box = view.view_box.scaled_about_center(factor);
        self.apply(
            cx,
            ViewState {
                view_box,
                rotate: view.rotate + twist,
            },
        );
        true
    }

    fn begin_gesture(&mut self, cx: &mut HandlerContext<'_>, at: Point) -> bool {
        self.ignore_click_until = None;
        if !self.contains_screen_point(cx, at) {
            return false;
        }
        let Some(view) = self.load_view(cx) else {
            return false;
        };
        self.gesture_origin = Some(view);
        self.gesture_changed = false;
        true
    }

    /// Finish a pointer gesture. `leave_mode` is false when a second
    /// contact merely took over from the first.
    fn end_gesture(&mut self, cx: &mut HandlerContext<'_>, leave_mode: bool) -> bool {
        if self.gesture_origin.take().is_none() {
            return false;
        }
        if self.gesture_changed {
            self.ignore_click_until = Some(cx.now_ms + cx.config.synthetic_click_delay_ms);
            self.commit(cx);
        }
        if leave_mode && self.mode != GestureMode::Move {
            log::debug!("location view leaves {:?} mode (commit)", self.mode);
            if self.mode_changed {
                self.commit(cx);
            }
            self.mode = GestureMode::Move;
            self.mode_origin = None;
            self.mode_changed = false;
        }
        true
    }

    fn commit(&mut self, cx: &HandlerContext<'_>) {
        self.persist.arm(cx.now_ms);
    }

    /// A key or wheel step. Inside Scale/Rotate mode it stays uncommitted
    /// until the mode is left by pointer-up, so Escape can still discard it.
    fn step_taken(&mut self, cx: &HandlerContext<'_>) {
        if self.mode == GestureMode::Move {
            self.commit(cx);
        } else {
            self.mode_changed = true;
        }
    }

    fn enter_mode(&mut self, cx: &mut HandlerContext<'_>, mode: GestureMode) -> bool {
        if self.mode_origin.is_none() {
            let Some(view) = self.load_view(cx) else {
                return false;
            };
            self.mode_origin = Some(view);
            self.mode_changed = false;
        }
        log::debug!("location view enters {mode:?} mode");
        self.mode = mode;
        true
    }

    /// Revert to the state captured at mode entry. Nothing done inside the
    /// mode has been armed for saving; a save armed before it still fires.
    fn abort(&mut self, cx: &mut HandlerContext<'_>) {
        if let Some(origin) = self.mode_origin.take() {
            self.apply(cx, origin);
        }
        log::debug!("location view aborts {:?} mode", self.mode);
        self.mode = GestureMode::Move;
        self.mode_changed = false;
        self.gesture_origin = None;
    }

    fn persist_now(&mut self, cx: &mut HandlerContext<'_>) {
        if !cx.surface.is_visible(&self.geometry_panel) {
            log::debug!("view geometry panel hidden, not saving view");
            return;
        }
        let view = match self.view {
            Some(view) => Some(view),
            None => self.load_view(cx),
        };
        let Some(view) = view else {
            return;
        };
        let payload = GeometryPayload::ViewGeometry {
            svg_view_box_str: view.view_box.to_string(),
            svg_rotate: view.rotate,
        };
        if let Err(e) = cx.transport.post(&cx.config.view_geometry_url, &payload) {
            log::warn!("saving view geometry failed: {e}");
        }
    }

    // ─── Event handlers ──────────────────────────────────────────────────

    fn handle_single_move(&mut self, cx: &mut HandlerContext<'_>, ev: &SinglePointerEvent) -> bool {
        if self.gesture_origin.is_none() {
            return false;
        }
        let changed = match self.mode {
            GestureMode::Move => self.pan(cx, ev),
            GestureMode::Scale => self.radial_zoom(cx, ev),
            GestureMode::Rotate => self.radial_rotate(cx, ev),
        };
        self.gesture_changed |= changed;
        true
    }

    fn handle_double_move(&mut self, cx: &mut HandlerContext<'_>, ev: &DoublePointerEvent) -> bool {
        if self.gesture_origin.is_none() {
            return false;
        }
        self.gesture_changed |= self.pinch(cx, ev);
        true
    }

    fn handle_wheel(&mut self, cx: &mut HandlerContext<'_>, wheel: &WheelInput) -> bool {
        if wheel.delta_y == 0.0 || !self.contains_screen_point(cx, wheel.position()) {
            return false;
        }
        let Some(view) = self.load_view(cx) else {
            return false;
        };
        // Scrolling up zooms in / turns clockwise
        let up = wheel.delta_y < 0.0;
        if self.mode == GestureMode::Rotate {
            let step = cx.config.wheel_rotate_step_deg;
            self.rotate_by(cx, view, if up { step } else { -step });
        } else {
            let step = cx.config.zoom_step;
            self.zoom(cx, view, if up { 1.0 - step } else { 1.0 + step });
        }
        self.step_taken(cx);
        true
    }

    fn handle_key(&mut self, cx: &mut HandlerContext<'_>, key: &KeyInput) -> bool {
        if !self.selected {
            return false;
        }
        let Some(action) = ShortcutMap::resolve(&key.key, key.ctrl, key.shift, key.alt, key.meta)
        else {
            return false;
        };

        match action {
            ShortcutAction::EnterScaleMode => self.enter_mode(cx, GestureMode::Scale),
            ShortcutAction::EnterRotateMode => self.enter_mode(cx, GestureMode::Rotate),
            ShortcutAction::Increase | ShortcutAction::Decrease => {
                let Some(view) = self.load_view(cx) else {
                    return false;
                };
                let sign = if action == ShortcutAction::Increase { 1.0 } else { -1.0 };
                if self.mode == GestureMode::Rotate {
                    self.rotate_by(cx, view, sign * cx.config.key_rotate_step_deg);
                } else {
                    self.zoom(cx, view, 1.0 - sign * cx.config.zoom_step);
                }
                self.step_taken(cx);
                true
            }
            ShortcutAction::Abort => {
                if self.mode == GestureMode::Move {
                    return false;
                }
                self.abort(cx);
                true
            }
        }
    }
}

impl GestureHandler for LocationViewController {
    fn handle(&mut self, cx: &mut HandlerContext<'_>, gesture: &Gesture) -> bool {
        match gesture {
            Gesture::SingleStart(ev) => self.begin_gesture(cx, ev.start.point()),
            Gesture::SingleMove(ev) => self.handle_single_move(cx, ev),
            Gesture::SingleEnd(ev) => self.end_gesture(cx, !ev.is_superseded()),
            Gesture::DoubleStart(ev) => self.begin_gesture(cx, ev.start.center),
            Gesture::DoubleMove(ev) => self.handle_double_move(cx, ev),
            Gesture::DoubleEnd(_) => self.end_gesture(cx, true),
            Gesture::Wheel(wheel) => self.handle_wheel(cx, wheel),
            Gesture::Click(click) => {
                if let Some(until) = self.ignore_click_until.take()
                    && click.time_ms <= until
                {
                    return true;
                }
                if !self.contains_screen_point(cx, click.position()) {
                    return false;
                }
                if !self.selected {
                    self.selected = true;
                    cx.selection.publish(SelectionOrigin::LocationView);
                }
                true
            }
            Gesture::KeyDown(key) => self.handle_key(cx, key),
            Gesture::LastPointerLocation(_) => false,
        }
    }

    fn on_selection_made(&mut self, cx: &mut HandlerContext<'_>, origin: SelectionOrigin) {
        if origin == SelectionOrigin::LocationView || !self.selected {
            return;
        }
        if self.mode != GestureMode::Move {
            self.abort(cx);
        }
        self.selected = false;
    }

    fn poll(&mut self, cx: &mut HandlerContext<'_>) {
        if self.persist.fire_if_due(cx.now_ms) {
            self.persist_now(cx);
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        self.persist.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TargetInfo;
    use crate::selection::SelectionBus;
    use crate::testing::{MemorySurface, RecordingTransport};
    use hi_core::Rect;

    const SVG: &str = "hi-location-view-svg";

    struct Fixture {
        surface: MemorySurface,
        transport: RecordingTransport,
        selection: SelectionBus,
        config: GestureConfig,
    }

    impl Fixture {
        fn new(view_box: &str) -> Self {
            Self {
                surface: MemorySurface::new()
                    .with_attribute(SVG, "viewBox", view_box)
                    .with_rect(SVG, Rect::new(0.0, 0.0, 400.0, 400.0)),
                transport: RecordingTransport::new(),
                selection: SelectionBus::new(),
                config: GestureConfig::default(),
            }
        }

        fn run(&mut self, controller: &mut LocationViewController, gesture: &Gesture) -> bool {
            let mut cx = HandlerContext {
                surface: &mut self.surface,
                transport: &mut self.transport,
                selection: &mut self.selection,
                config: &self.config,
                now_ms: 0.0,
            };
            controller.handle(&mut cx, gesture)
        }
    }

    fn wheel_out() -> Gesture {
        Gesture::Wheel(WheelInput {
            x: 200.0,
            y: 200.0,
            delta_y: 120.0,
            time_ms: 0.0,
        })
    }

    #[test]
    fn extents_default_to_first_view_box() {
        let mut fx = Fixture::new("0 0 400 300");
        let mut controller = LocationViewController::new(&fx.config);
        assert!(fx.run(&mut controller, &wheel_out()));
        // Cannot zoom out past what was first shown
        assert_eq!(fx.surface.attr(SVG, "viewBox"), Some("0 0 400 300"));
        assert!(controller.is_persist_pending());
    }

    #[test]
    fn missing_view_box_is_not_handled() {
        let mut fx = Fixture::new("garbage");
        let mut controller = LocationViewController::new(&fx.config);
        assert!(!fx.run(&mut controller, &wheel_out()));
        assert!(!controller.is_persist_pending());
    }

    #[test]
    fn losing_selection_aborts_mode() {
        let mut fx = Fixture::new("0 0 400 400");
        let mut controller = LocationViewController::new(&fx.config);
        let click = Gesture::Click(crate::input::ClickInput {
            x: 10.0,
            y: 10.0,
            time_ms: 0.0,
            target: TargetInfo::default(),
            synthetic: false,
        });
        assert!(fx.run(&mut controller, &click));
        assert!(controller.is_selected());
        assert!(fx.run(&mut controller, &Gesture::KeyDown(KeyInput::plain("r"))));
        assert_eq!(controller.mode(), GestureMode::Rotate);

        let mut cx = HandlerContext {
            surface: &mut fx.surface,
            transport: &mut fx.transport,
            selection: &mut fx.selection,
            config: &fx.config,
            now_ms: 0.0,
        };
        controller.on_selection_made(&mut cx, SelectionOrigin::Icon);
        assert!(!controller.is_selected());
        assert_eq!(controller.mode(), GestureMode::Move);
    }
}
