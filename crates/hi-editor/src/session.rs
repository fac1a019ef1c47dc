//! One gesture session per page.
//!
//! Owns the pointer tracker, the dispatcher and the host seams. The host
//! feeds it raw input and a clock; it answers with what to do to the DOM
//! event (capture, preventDefault, stopPropagation) and when to call back.

use crate::config::GestureConfig;
use crate::dispatch::{Gesture, GestureDispatcher, GestureHandler, HandlerContext};
use crate::host::{Surface, Transport};
use crate::input::{ClickInput, KeyInput, PointerInput, WheelInput};
use crate::pointer::{PointerTracker, TrackerStep};
use crate::selection::{Selection, SelectionBus};
use serde::Serialize;

/// What the host should do with the DOM event it just forwarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventOutcome {
    pub handled: bool,
    /// Call `setPointerCapture` on the event target.
    pub capture_pointer: bool,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

pub struct GestureSession<S: Surface, T: Transport> {
    surface: S,
    transport: T,
    config: GestureConfig,
    tracker: PointerTracker,
    dispatcher: GestureDispatcher,
    selection: SelectionBus,
}

impl<S: Surface, T: Transport> GestureSession<S, T> {
    pub fn new(surface: S, transport: T, config: GestureConfig) -> Self {
        let dispatcher = GestureDispatcher::new(&config);
        Self {
            surface,
            transport,
            config,
            tracker: PointerTracker::new(),
            dispatcher,
            selection: SelectionBus::new(),
        }
    }

    /// Install the path-edit collaborator.
    pub fn set_path_editor(&mut self, handler: Box<dyn GestureHandler>) {
        self.dispatcher.set_path_editor(handler);
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &GestureDispatcher {
        &self.dispatcher
    }

    /// The page-wide selection.
    pub fn selection(&self) -> Selection {
        if let Some(icon) = self.dispatcher.icon.selected() {
            Selection::Icon(icon.clone())
        } else if self.dispatcher.location.is_selected() {
            Selection::LocationView
        } else {
            Selection::None
        }
    }

    /// Earliest time `tick` has work to do.
    pub fn next_deadline(&self) -> Option<f64> {
        [self.tracker.next_deadline(), self.dispatcher.next_deadline()]
            .into_iter()
            .flatten()
            .reduce(f64::min)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, input: &PointerInput) -> EventOutcome {
        self.broadcast_location(input);
        let step = self.tracker.pointer_down(input);
        let mut outcome = self.run_step(step, input.time_ms);
        outcome.stop_propagation = outcome.handled;
        outcome
    }

    pub fn pointer_move(&mut self, input: &PointerInput) -> EventOutcome {
        self.broadcast_location(input);
        let step = self.tracker.pointer_move(input, &self.config);
        let mut outcome = self.run_step(step, input.time_ms);
        outcome.prevent_default = outcome.handled;
        outcome.stop_propagation = outcome.handled;
        outcome
    }

    pub fn pointer_up(&mut self, input: &PointerInput) -> EventOutcome {
        self.broadcast_location(input);
        let step = self.tracker.pointer_up(input, &self.config);
        let mut outcome = self.run_step(step, input.time_ms);
        outcome.stop_propagation = outcome.handled;
        outcome
    }

    pub fn pointer_cancel(&mut self, input: &PointerInput) -> EventOutcome {
        self.broadcast_location(input);
        let step = self.tracker.pointer_cancel(input, &self.config);
        let mut outcome = self.run_step(step, input.time_ms);
        outcome.stop_propagation = outcome.handled;
        outcome
    }

    pub fn wheel(&mut self, input: &WheelInput) -> EventOutcome {
        let handled = self.dispatch(&Gesture::Wheel(input.clone()), input.time_ms);
        EventOutcome {
            handled,
            prevent_default: handled,
            stop_propagation: handled,
            ..EventOutcome::default()
        }
    }

    /// A click from the browser, or one the tracker synthesized.
    pub fn click(&mut self, input: &ClickInput) -> EventOutcome {
        if !input.synthetic {
            self.tracker.real_click();
        }
        let handled = self.dispatch(&Gesture::Click(input.clone()), input.time_ms);
        EventOutcome {
            handled,
            stop_propagation: handled,
            ..EventOutcome::default()
        }
    }

    pub fn key_down(&mut self, input: &KeyInput, now_ms: f64) -> EventOutcome {
        let handled = self.dispatch(&Gesture::KeyDown(input.clone()), now_ms);
        EventOutcome {
            handled,
            prevent_default: handled,
            stop_propagation: handled,
            ..EventOutcome::default()
        }
    }

    /// Run everything whose deadline has passed: the synthetic click first,
    /// then debounced persistence.
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(click) = self.tracker.take_due_click(now_ms) {
            self.click(&click);
        }
        let mut cx = HandlerContext {
            surface: &mut self.surface,
            transport: &mut self.transport,
            selection: &mut self.selection,
            config: &self.config,
            now_ms,
        };
        self.dispatcher.poll(&mut cx);
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn broadcast_location(&mut self, input: &PointerInput) {
        self.dispatch(&Gesture::LastPointerLocation(input.position()), input.time_ms);
    }

    fn run_step(&mut self, step: TrackerStep, now_ms: f64) -> EventOutcome {
        let mut handled = false;
        for gesture in &step.gestures {
            handled |= self.dispatch(gesture, now_ms);
        }
        EventOutcome {
            handled,
            capture_pointer: step.capture,
            ..EventOutcome::default()
        }
    }

    fn dispatch(&mut self, gesture: &Gesture, now_ms: f64) -> bool {
        let mut cx = HandlerContext {
            surface: &mut self.surface,
            transport: &mut self.transport,
            selection: &mut self.selection,
            config: &self.config,
            now_ms,
        };
        self.dispatcher.dispatch(&mut cx, gesture)
    }
}
