//! WASM bridge for the location view: binds the gesture engine to the DOM.
//!
//! Compiled via `wasm-pack build --target web`. The page creates one
//! `LocationGestures` per location view, forwards its pointer, wheel, click
//! and key events, and keeps a timer on `next_deadline()`:
//!
//! ```js
//! const gestures = new LocationGestures(JSON.stringify(config));
//! svg.addEventListener("pointerdown", (e) => { gestures.on_pointer_down(e); arm(); });
//! function arm() {
//!   const at = gestures.next_deadline();
//!   if (at !== undefined) setTimeout(() => { gestures.tick(performance.now()); arm(); },
//!                                    Math.max(0, at - performance.now()));
//! }
//! ```
//!
//! The base `<svg>` must carry `data-extents="x y w h"` with the full plan.
//! Without it the first viewBox seen becomes the zoom-out limit.

mod dom;
mod transport;

use dom::DomSurface;
use hi_editor::config::GestureConfig;
use hi_editor::selection::Selection;
use hi_editor::session::{EventOutcome, GestureSession};
use transport::AntinodeTransport;
use wasm_bindgen::prelude::*;
use web_sys::{Event, KeyboardEvent, MouseEvent, PointerEvent, WheelEvent};

#[wasm_bindgen]
pub struct LocationGestures {
    session: GestureSession<DomSurface, AntinodeTransport>,
}

#[wasm_bindgen]
impl LocationGestures {
    /// Create the engine from a (possibly empty or partial) JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<LocationGestures, JsValue> {
        console_error_panic_hook_setup();

        let config = GestureConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?;
        init_logging(&config.log_level);

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        log::info!("location gestures ready on #{}", config.base_svg_id);

        Ok(Self {
            session: GestureSession::new(DomSurface::new(document), AntinodeTransport, config),
        })
    }

    /// Returns true if the engine claimed the event.
    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> bool {
        let outcome = self.session.pointer_down(&dom::pointer_input(event));
        if outcome.capture_pointer {
            dom::capture_pointer(event);
        }
        apply_outcome(event, outcome)
    }

    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        let outcome = self.session.pointer_move(&dom::pointer_input(event));
        apply_outcome(event, outcome)
    }

    pub fn on_pointer_up(&mut self, event: &PointerEvent) -> bool {
        let outcome = self.session.pointer_up(&dom::pointer_input(event));
        apply_outcome(event, outcome)
    }

    pub fn on_pointer_cancel(&mut self, event: &PointerEvent) -> bool {
        let outcome = self.session.pointer_cancel(&dom::pointer_input(event));
        apply_outcome(event, outcome)
    }

    pub fn on_wheel(&mut self, event: &WheelEvent) -> bool {
        let outcome = self.session.wheel(&dom::wheel_input(event));
        apply_outcome(event, outcome)
    }

    pub fn on_click(&mut self, event: &MouseEvent) -> bool {
        let outcome = self.session.click(&dom::click_input(event));
        apply_outcome(event, outcome)
    }

    pub fn on_key_down(&mut self, event: &KeyboardEvent) -> bool {
        let outcome = self
            .session
            .key_down(&dom::key_input(event), event.time_stamp());
        apply_outcome(event, outcome)
    }

    /// Run due deadlines. `now` is `performance.now()`.
    pub fn tick(&mut self, now: f64) {
        self.session.tick(now);
    }

    /// When `tick` next has work, on the `performance.now()` clock.
    pub fn next_deadline(&self) -> Option<f64> {
        self.session.next_deadline()
    }

    /// Current selection as JSON: `{"kind":"none"}`, `{"kind":"location_view"}`
    /// or `{"kind":"icon","id":"..."}`.
    pub fn selection_json(&self) -> String {
        selection_to_json(&self.session.selection())
    }
}

fn apply_outcome(event: &Event, outcome: EventOutcome) -> bool {
    if outcome.prevent_default {
        event.prevent_default();
    }
    if outcome.stop_propagation {
        event.stop_propagation();
    }
    outcome.handled
}

fn selection_to_json(selection: &Selection) -> String {
    let value = match selection {
        Selection::None => serde_json::json!({"kind": "none"}),
        Selection::LocationView => serde_json::json!({"kind": "location_view"}),
        Selection::Icon(id) => serde_json::json!({"kind": "icon", "id": id.as_str()}),
    };
    value.to_string()
}

// ─── Logging ─────────────────────────────────────────────────────────────

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg: JsValue = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Unknown level names fall back to `info`.
fn level_filter(name: &str) -> log::LevelFilter {
    name.parse().unwrap_or(log::LevelFilter::Info)
}

fn init_logging(level: &str) {
    // Only the first engine on the page installs the logger
    if log::set_logger(&LOGGER).is_err() {
        log::trace!("console logger already installed");
    }
    log::set_max_level(level_filter(level));
}

/// Set up panic hook for better error messages in the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("HI WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
