//! Gesture dispatcher: an ordered first-responder chain.
//!
//! Every higher-level gesture is offered to the icon controller first, then
//! (for clicks and key presses only) to the path-edit collaborator, then to
//! the location-view controller. The first handler that returns `true`
//! claims the gesture and the rest never see it.
//!
//! Two exceptions to the chain:
//!
//! - Clicks and key presses whose target is a text input or sits inside a
//!   modal dialog are not offered to anyone.
//! - Last-pointer-location updates are bookkeeping; every handler sees them.

use crate::config::GestureConfig;
use crate::host::{Surface, Transport};
use crate::icon::IconController;
use crate::input::{ClickInput, KeyInput, WheelInput};
use crate::location_view::LocationViewController;
use crate::pointer::{DoublePointerEvent, SinglePointerEvent};
use crate::selection::{SelectionBus, SelectionOrigin};
use hi_core::Point;

/// A higher-level input event offered to the handler chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    SingleStart(SinglePointerEvent),
    SingleMove(SinglePointerEvent),
    SingleEnd(SinglePointerEvent),
    DoubleStart(DoublePointerEvent),
    DoubleMove(DoublePointerEvent),
    DoubleEnd(DoublePointerEvent),
    Wheel(WheelInput),
    Click(ClickInput),
    KeyDown(KeyInput),
    /// Screen position of the most recent pointer event of any kind.
    LastPointerLocation(Point),
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SingleStart(_) => "single-start",
            Self::SingleMove(_) => "single-move",
            Self::SingleEnd(_) => "single-end",
            Self::DoubleStart(_) => "double-start",
            Self::DoubleMove(_) => "double-move",
            Self::DoubleEnd(_) => "double-end",
            Self::Wheel(_) => "wheel",
            Self::Click(_) => "click",
            Self::KeyDown(_) => "key-down",
            Self::LastPointerLocation(_) => "last-pointer-location",
        }
    }

    /// Clicks and key presses also go to the path-edit collaborator.
    fn reaches_path_editor(&self) -> bool {
        matches!(self, Self::Click(_) | Self::KeyDown(_))
    }

    /// Clicks and key presses on form fields or dialogs are not ours.
    fn is_excluded(&self) -> bool {
        match self {
            Self::Click(click) => click.target.excludes_shortcuts(),
            Self::KeyDown(key) => key.target.excludes_shortcuts(),
            _ => false,
        }
    }
}

/// Everything a handler may touch while handling one gesture.
pub struct HandlerContext<'a> {
    pub surface: &'a mut dyn Surface,
    pub transport: &'a mut dyn Transport,
    pub selection: &'a mut SelectionBus,
    pub config: &'a GestureConfig,
    pub now_ms: f64,
}

/// A participant in the first-responder chain.
pub trait GestureHandler {
    /// Try to handle a gesture. Returning `true` claims it.
    fn handle(&mut self, cx: &mut HandlerContext<'_>, gesture: &Gesture) -> bool;

    /// Some handler (possibly this one) made a new selection.
    fn on_selection_made(&mut self, _cx: &mut HandlerContext<'_>, _origin: SelectionOrigin) {}

    /// Run any deadline that has passed.
    fn poll(&mut self, _cx: &mut HandlerContext<'_>) {}

    fn next_deadline(&self) -> Option<f64> {
        None
    }
}

/// Owns the handler chain.
pub struct GestureDispatcher {
    pub icon: IconController,
    path_editor: Option<Box<dyn GestureHandler>>,
    pub location: LocationViewController,
}

impl GestureDispatcher {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            icon: IconController::new(config),
            path_editor: None,
            location: LocationViewController::new(config),
        }
    }

    /// Install the path-edit collaborator, consulted for clicks and key
    /// presses between the icon and location-view controllers.
    pub fn set_path_editor(&mut self, handler: Box<dyn GestureHandler>) {
        self.path_editor = Some(handler);
    }

    /// Offer a gesture to the chain. Returns whether anyone claimed it.
    pub fn dispatch(&mut self, cx: &mut HandlerContext<'_>, gesture: &Gesture) -> bool {
        let handled = match gesture {
            Gesture::LastPointerLocation(_) => {
                let mut any = self.icon.handle(cx, gesture);
                any |= self.location.handle(cx, gesture);
                any
            }
            _ if gesture.is_excluded() => {
                log::trace!("{} ignored: target is a form field or dialog", gesture.name());
                false
            }
            _ => self.first_responder(cx, gesture),
        };
        self.deliver_selection(cx);
        handled
    }

    /// Run due deadlines on every handler.
    pub fn poll(&mut self, cx: &mut HandlerContext<'_>) {
        self.for_each_handler(|handler| handler.poll(cx));
        self.deliver_selection(cx);
    }

    pub fn next_deadline(&self) -> Option<f64> {
        [
            self.icon.next_deadline(),
            self.path_editor.as_ref().and_then(|p| p.next_deadline()),
            self.location.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .reduce(f64::min)
    }

    fn first_responder(&mut self, cx: &mut HandlerContext<'_>, gesture: &Gesture) -> bool {
        if self.icon.handle(cx, gesture) {
            log::trace!("{} handled by icon controller", gesture.name());
            return true;
        }
        if gesture.reaches_path_editor()
            && let Some(path_editor) = self.path_editor.as_mut()
            && path_editor.handle(cx, gesture)
        {
            log::trace!("{} handled by path editor", gesture.name());
            return true;
        }
        if self.location.handle(cx, gesture) {
            log::trace!("{} handled by location view", gesture.name());
            return true;
        }
        false
    }

    /// Deliver "selection made" to every handler until no new ones appear.
    fn deliver_selection(&mut self, cx: &mut HandlerContext<'_>) {
        loop {
            let origins = cx.selection.drain();
            if origins.is_empty() {
                break;
            }
            for origin in origins {
                self.for_each_handler(|handler| handler.on_selection_made(cx, origin));
            }
        }
    }

    fn for_each_handler(&mut self, mut f: impl FnMut(&mut dyn GestureHandler)) {
        f(&mut self.icon);
        if let Some(path_editor) = self.path_editor.as_mut() {
            f(path_editor.as_mut());
        }
        f(&mut self.location);
    }
}
