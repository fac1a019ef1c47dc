//! Select, drag, scale and rotate the icons placed on the map.
//!
//! An icon is a group tagged `data-type="svg-icon"` whose `transform`
//! attribute is `scale(s s) translate(x, y) rotate(a, cx, cy)`. Its
//! position in map units is therefore `scale × translate`.
//!
//! - A click selects an icon and loads its details panel.
//! - Pressing down on the selected icon and moving past a small threshold
//!   drags it.
//! - `s` / `r` enter scale / rotate mode; plain pointer movement then
//!   drives the transform, anchored on the icon's on-screen center. The
//!   next pointer-up commits, Escape reverts.
//!
//! Every commit POSTs the icon's visual center, scale and rotation.

use crate::config::GestureConfig;
use crate::dispatch::{Gesture, GestureHandler, HandlerContext};
use crate::host::GeometryPayload;
use crate::input::{ClickInput, ElementId, KeyInput};
use crate::pointer::SinglePointerEvent;
use crate::selection::SelectionOrigin;
use crate::shortcuts::{GestureMode, ShortcutAction, ShortcutMap};
use hi_core::{
    Point, Translate, TransformState, Vec2, angle, distance, normalize_angle, parse_transform,
    screen_to_svg_point,
};

/// What the controller is doing with the selected icon.
#[derive(Debug, Clone, PartialEq)]
enum IconAction {
    Idle,
    /// Pointer is down on the selected icon.
    Drag {
        icon: ElementId,
        original: TransformState,
        /// Cursor minus icon position, in map units.
        offset: Vec2,
        start: Point,
        dragging: bool,
    },
    /// Keyboard-entered scale or rotate mode.
    Transform {
        icon: ElementId,
        mode: GestureMode,
        /// State before the first mode was entered (Escape target).
        original: TransformState,
        /// State when the current mode was entered.
        base: TransformState,
        /// Icon's on-screen center at mode entry.
        center: Point,
        /// Pointer position at mode entry.
        start_pointer: Point,
    },
}

pub struct IconController {
    svg: ElementId,
    selected: Option<ElementId>,
    action: IconAction,
    last_pointer: Option<Point>,
    ignore_click: bool,
}

impl IconController {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            svg: ElementId::new(config.base_svg_id.clone()),
            selected: None,
            action: IconAction::Idle,
            last_pointer: None,
            ignore_click: false,
        }
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The keyboard mode in effect, `Move` unless scaling or rotating.
    pub fn mode(&self) -> GestureMode {
        match &self.action {
            IconAction::Transform { mode, .. } => *mode,
            _ => GestureMode::Move,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.action, IconAction::Drag { dragging: true, .. })
    }

    // ─── DOM state ───────────────────────────────────────────────────────

    fn load_transform(cx: &HandlerContext<'_>, icon: &ElementId) -> TransformState {
        parse_transform(cx.surface.attribute(icon, "transform").as_deref())
    }

    fn write_transform(cx: &mut HandlerContext<'_>, icon: &ElementId, state: &TransformState) {
        log::trace!("icon {icon} transform {state}");
        cx.surface.set_attribute(icon, "transform", &state.compose());
    }

    fn cursor_in_svg(&self, cx: &HandlerContext<'_>, at: Point) -> Option<Point> {
        cx.surface
            .screen_matrix(&self.svg)
            .map(|matrix| screen_to_svg_point(matrix, at.x, at.y))
    }

    fn icon_position(state: &TransformState) -> Point {
        Point::new(
            state.scale.x * state.translate.x,
            state.scale.y * state.translate.y,
        )
    }

    /// Server-side identifier: the configured id attribute, else the DOM id.
    fn server_id(cx: &HandlerContext<'_>, icon: &ElementId) -> String {
        cx.surface
            .attribute(icon, &cx.config.icon_id_attribute)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| icon.as_str().to_string())
    }

    fn pointer_in_map(&self, cx: &HandlerContext<'_>) -> bool {
        match (self.last_pointer, cx.surface.bounding_rect(&self.svg)) {
            (Some(pointer), Some(rect)) => rect.contains(pointer),
            _ => false,
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// POST the icon's geometry. The center comes from its rendered bounds
    /// since rotation moves the visual center away from the translate.
    fn persist(&self, cx: &mut HandlerContext<'_>, icon: &ElementId) {
        let state = Self::load_transform(cx, icon);
        let center = cx
            .surface
            .bounding_rect(icon)
            .map(|rect| rect.center())
            .and_then(|center| self.cursor_in_svg(cx, center))
            .unwrap_or_else(|| Self::icon_position(&state));

        let payload = GeometryPayload::IconGeometry {
            svg_x: center.x,
            svg_y: center.y,
            svg_scale: state.scale.x,
            svg_rotate: state.rotate.angle,
        };
        let url = cx.config.icon_geometry_url_for(&Self::server_id(cx, icon));
        if let Err(e) = cx.transport.post(&url, &payload) {
            log::warn!("saving icon geometry failed: {e}");
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    fn select(&mut self, cx: &mut HandlerContext<'_>, icon: ElementId) {
        self.revert(cx);
        log::debug!("icon {icon} selected");
        let url = cx.config.icon_details_url_for(&Self::server_id(cx, &icon));
        if let Err(e) = cx.transport.get(&url) {
            log::warn!("loading icon details failed: {e}");
        }
        self.selected = Some(icon);
        cx.selection.publish(SelectionOrigin::Icon);
    }

    /// Undo any uncommitted drag or scale/rotate.
    fn revert(&mut self, cx: &mut HandlerContext<'_>) -> bool {
        match std::mem::replace(&mut self.action, IconAction::Idle) {
            IconAction::Idle => false,
            IconAction::Drag { icon, original, .. }
            | IconAction::Transform { icon, original, .. } => {
                log::debug!("icon {icon} edit aborted");
                Self::write_transform(cx, &icon, &original);
                true
            }
        }
    }

    fn handle_click(&mut self, cx: &mut HandlerContext<'_>, click: &ClickInput) -> bool {
        if self.ignore_click {
            self.ignore_click = false;
            return true;
        }
        let Some(icon) = click.target.icon.clone() else {
            return false;
        };
        if self.selected.as_ref() != Some(&icon) {
            self.select(cx, icon);
        }
        true
    }

    // ─── Drag ────────────────────────────────────────────────────────────

    fn begin_drag(&mut self, cx: &mut HandlerContext<'_>, ev: &SinglePointerEvent) -> bool {
        self.ignore_click = false;
        if matches!(self.action, IconAction::Transform { .. }) {
            // Pointer-up will commit the mode; keep the map still meanwhile
            return true;
        }
        let Some(icon) = ev.start_input().and_then(|input| input.target.icon.clone()) else {
            return false;
        };
        if self.selected.as_ref() != Some(&icon) {
            return false;
        }
        let start = ev.start.point();
        let Some(cursor) = self.cursor_in_svg(cx, start) else {
            return false;
        };
        let original = Self::load_transform(cx, &icon);
        let offset = cursor - Self::icon_position(&original);
        self.action = IconAction::Drag {
            icon,
            original,
            offset,
            start,
            dragging: false,
        };
        true
    }

    fn drag_to(&mut self, cx: &mut HandlerContext<'_>, ev: &SinglePointerEvent) -> bool {
        let threshold = cx.config.icon_drag_threshold_px;
        let cursor = self.cursor_in_svg(cx, ev.last.point());
        let in_mode = matches!(self.action, IconAction::Transform { .. });
        let IconAction::Drag {
            icon,
            original,
            offset,
            start,
            dragging,
        } = &mut self.action
        else {
            return in_mode;
        };

        if !*dragging {
            if distance(*start, ev.last.point()) < threshold {
                return true;
            }
            log::debug!("icon {icon} drag started");
            *dragging = true;
        }
        let Some(cursor) = cursor else {
            return true;
        };
        let position = cursor - *offset;
        let mut state = *original;
        state.translate = Translate {
            x: position.x / original.scale.x,
            y: position.y / original.scale.y,
        };
        let icon = icon.clone();
        Self::write_transform(cx, &icon, &state);
        true
    }

    fn end_pointer(&mut self, cx: &mut HandlerContext<'_>, ev: &SinglePointerEvent) -> bool {
        match &self.action {
            IconAction::Idle => false,
            IconAction::Drag { icon, dragging, .. } => {
                let (icon, dragging) = (icon.clone(), *dragging);
                self.action = IconAction::Idle;
                if dragging {
                    self.ignore_click = true;
                    self.persist(cx, &icon);
                }
                true
            }
            IconAction::Transform { icon, mode, .. } => {
                if ev.is_superseded() {
                    return true;
                }
                let icon = icon.clone();
                log::debug!("icon {icon} leaves {mode:?} mode (commit)");
                self.action = IconAction::Idle;
                self.ignore_click = true;
                self.persist(cx, &icon);
                true
            }
        }
    }

    // ─── Scale / rotate ──────────────────────────────────────────────────

    fn enter_mode(&mut self, cx: &mut HandlerContext<'_>, mode: GestureMode) -> bool {
        let Some(icon) = self.selected.clone() else {
            return false;
        };
        if !self.pointer_in_map(cx) {
            return false;
        }
        let (Some(start_pointer), Some(rect)) = (self.last_pointer, cx.surface.bounding_rect(&icon))
        else {
            return false;
        };
        let base = Self::load_transform(cx, &icon);
        let original = match &self.action {
            IconAction::Transform { original, .. } => *original,
            _ => base,
        };
        log::debug!("icon {icon} enters {mode:?} mode");
        self.action = IconAction::Transform {
            icon,
            mode,
            original,
            base,
            center: rect.center(),
            start_pointer,
        };
        true
    }

    /// Follow the pointer while scaling or rotating.
    fn track_pointer(&mut self, cx: &mut HandlerContext<'_>, pointer: Point) -> bool {
        let IconAction::Transform {
            icon,
            mode,
            base,
            center,
            start_pointer,
            ..
        } = &self.action
        else {
            return false;
        };

        let mut state = *base;
        match mode {
            GestureMode::Scale => {
                let stretch = distance(*center, pointer) - distance(*center, *start_pointer);
                let factor = 1.0 + stretch * cx.config.icon_scale_per_px;
                let x = (base.scale.x * factor).max(cx.config.min_icon_scale);
                let y = (base.scale.y * factor).max(cx.config.min_icon_scale);
                state.scale.x = x;
                state.scale.y = y;
                // Keep the icon's map position fixed
                state.translate.x = base.translate.x * base.scale.x / x;
                state.translate.y = base.translate.y * base.scale.y / y;
            }
            GestureMode::Rotate => {
                let turned = angle(*center, pointer) - angle(*center, *start_pointer);
                state.rotate.angle = normalize_angle(base.rotate.angle + turned);
            }
            GestureMode::Move => return false,
        }
        let icon = icon.clone();
        Self::write_transform(cx, &icon, &state);
        true
    }

    fn handle_key(&mut self, cx: &mut HandlerContext<'_>, key: &KeyInput) -> bool {
        if self.selected.is_none() {
            return false;
        }
        match ShortcutMap::resolve(&key.key, key.ctrl, key.shift, key.alt, key.meta) {
            Some(ShortcutAction::EnterScaleMode) => self.enter_mode(cx, GestureMode::Scale),
            Some(ShortcutAction::EnterRotateMode) => self.enter_mode(cx, GestureMode::Rotate),
            Some(ShortcutAction::Abort) => self.revert(cx),
            _ => false,
        }
    }
}

impl GestureHandler for IconController {
    fn handle(&mut self, cx: &mut HandlerContext<'_>, gesture: &Gesture) -> bool {
        match gesture {
            Gesture::SingleStart(ev) => self.begin_drag(cx, ev),
            Gesture::SingleMove(ev) => self.drag_to(cx, ev),
            Gesture::SingleEnd(ev) => self.end_pointer(cx, ev),
            Gesture::DoubleStart(_) | Gesture::DoubleMove(_) | Gesture::DoubleEnd(_) => false,
            Gesture::Wheel(_) => false,
            Gesture::Click(click) => self.handle_click(cx, click),
            Gesture::KeyDown(key) => self.handle_key(cx, key),
            Gesture::LastPointerLocation(point) => {
                self.last_pointer = Some(*point);
                self.track_pointer(cx, *point)
            }
        }
    }

    fn on_selection_made(&mut self, cx: &mut HandlerContext<'_>, origin: SelectionOrigin) {
        if origin == SelectionOrigin::Icon {
            return;
        }
        self.revert(cx);
        if let Some(icon) = self.selected.take() {
            log::debug!("icon {icon} deselected");
        }
    }
}
