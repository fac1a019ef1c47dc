//! `Surface` over the live DOM, and DOM event → engine input conversion.

use hi_core::{Affine, Rect};
use hi_editor::host::Surface;
use hi_editor::input::{
    ClickInput, ElementId, KeyInput, PointerInput, PointerKind, TargetInfo, WheelInput,
};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, KeyboardEvent, MouseEvent, PointerEvent, SvgElement,
    SvgGraphicsElement, WheelEvent,
};

/// Icons are groups tagged with this attribute value.
const ICON_SELECTOR: &str = r#"[data-type="svg-icon"]"#;
const MODAL_SELECTOR: &str = ".modal";

pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn element(&self, id: &ElementId) -> Option<Element> {
        self.document.get_element_by_id(id.as_str())
    }
}

impl Surface for DomSurface {
    fn attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn set_attribute(&mut self, element: &ElementId, name: &str, value: &str) {
        let Some(el) = self.element(element) else {
            log::debug!("set {name}: no element #{element}");
            return;
        };
        if let Err(e) = el.set_attribute(name, value) {
            log::warn!("set {name} on #{element} failed: {e:?}");
        }
    }

    fn set_style_property(&mut self, element: &ElementId, name: &str, value: &str) {
        let Some(el) = self.element(element) else {
            return;
        };
        let style = if let Some(svg) = el.dyn_ref::<SvgElement>() {
            svg.style()
        } else if let Some(html) = el.dyn_ref::<HtmlElement>() {
            html.style()
        } else {
            return;
        };
        if let Err(e) = style.set_property(name, value) {
            log::warn!("set style {name} on #{element} failed: {e:?}");
        }
    }

    fn bounding_rect(&self, element: &ElementId) -> Option<Rect> {
        let rect = self.element(element)?.get_bounding_client_rect();
        Some(Rect::new(
            rect.x(),
            rect.y(),
            rect.x() + rect.width(),
            rect.y() + rect.height(),
        ))
    }

    fn screen_matrix(&self, element: &ElementId) -> Option<Affine> {
        let el = self.element(element)?;
        let m = el.dyn_ref::<SvgGraphicsElement>()?.get_screen_ctm()?;
        Some(Affine::new([
            m.a() as f64,
            m.b() as f64,
            m.c() as f64,
            m.d() as f64,
            m.e() as f64,
            m.f() as f64,
        ]))
    }

    fn is_visible(&self, element: &ElementId) -> bool {
        // Same test as jQuery's :visible
        self.element(element)
            .is_some_and(|el| el.get_client_rects().length() > 0)
    }
}

// ─── Event conversion ────────────────────────────────────────────────────

fn non_empty_id(el: &Element) -> Option<ElementId> {
    let id = el.id();
    (!id.is_empty()).then(|| ElementId::new(id))
}

fn closest(el: &Element, selector: &str) -> Option<Element> {
    el.closest(selector).ok().flatten()
}

/// Resolve the DOM questions about an event target once.
pub fn target_info(event: &Event) -> TargetInfo {
    let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return TargetInfo::default();
    };
    let tag = el.tag_name().to_ascii_uppercase();
    TargetInfo {
        element: non_empty_id(&el),
        icon: closest(&el, ICON_SELECTOR).and_then(|icon| non_empty_id(&icon)),
        is_text_input: tag == "INPUT" || tag == "TEXTAREA",
        in_modal: closest(&el, MODAL_SELECTOR).is_some(),
    }
}

pub fn pointer_input(event: &PointerEvent) -> PointerInput {
    PointerInput {
        pointer_id: event.pointer_id(),
        kind: PointerKind::from_dom(&event.pointer_type()),
        buttons: event.buttons(),
        x: f64::from(event.client_x()),
        y: f64::from(event.client_y()),
        time_ms: event.time_stamp(),
        target: target_info(event),
    }
}

pub fn wheel_input(event: &WheelEvent) -> WheelInput {
    WheelInput {
        x: f64::from(event.client_x()),
        y: f64::from(event.client_y()),
        delta_y: event.delta_y(),
        time_ms: event.time_stamp(),
    }
}

pub fn click_input(event: &MouseEvent) -> ClickInput {
    ClickInput {
        x: f64::from(event.client_x()),
        y: f64::from(event.client_y()),
        time_ms: event.time_stamp(),
        target: target_info(event),
        synthetic: false,
    }
}

pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        ctrl: event.ctrl_key(),
        shift: event.shift_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
        target: target_info(event),
    }
}

/// Keep move/up events for this contact routed to its target.
pub fn capture_pointer(event: &PointerEvent) {
    let Some(el) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    if let Err(e) = el.set_pointer_capture(event.pointer_id()) {
        log::debug!("pointer capture failed: {e:?}");
    }
}
