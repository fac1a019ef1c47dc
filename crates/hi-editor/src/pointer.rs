//! Pointer session tracker.
//!
//! Turns raw pointer down/move/up/cancel events into two higher-level
//! streams: a single-pointer gesture while exactly one contact is down and a
//! double-pointer gesture while exactly two are. A third simultaneous
//! contact is not tracked at all.
//!
//! Moves are filtered twice before they reach a gesture: a per-pointer flood
//! guard (minimum time between processed moves) and a micro-movement guard
//! (minimum distance from the last processed position). Up and cancel are
//! never filtered.
//!
//! The tracker also watches for quick taps. Some trackpads suppress the
//! native `click` after a pointer sequence; when a down/up pair is short
//! and small enough, a click is armed with a deadline and fired by
//! [`PointerTracker::take_due_click`] unless a real click cancels it first.

use crate::config::GestureConfig;
use crate::dispatch::Gesture;
use crate::input::{ClickInput, PointerInput};
use hi_core::{Point, angle, distance, wrap_angle_delta};
use smallvec::SmallVec;

/// Gestures beyond two contacts are not supported.
pub const MAX_POINTERS: usize = 2;

// ─── Gesture event records ───────────────────────────────────────────────

/// One position in a single-pointer gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSnapshot {
    /// The raw event behind this position. `None` when the gesture was
    /// started or ended by the tracker rather than by an event for this
    /// pointer (for example when a second contact supersedes it).
    pub origin: Option<PointerInput>,
    pub x: f64,
    pub y: f64,
}

impl PointerSnapshot {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A gesture made with exactly one pointer.
///
/// `start` never changes; every update shifts `last` into `previous`.
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePointerEvent {
    pub start: PointerSnapshot,
    pub previous: PointerSnapshot,
    pub last: PointerSnapshot,
}

impl SinglePointerEvent {
    pub fn new(origin: Option<PointerInput>, x: f64, y: f64) -> Self {
        let snapshot = PointerSnapshot { origin, x, y };
        Self {
            start: snapshot.clone(),
            previous: snapshot.clone(),
            last: snapshot,
        }
    }

    pub fn update(&mut self, origin: Option<PointerInput>, x: f64, y: f64) {
        let last = PointerSnapshot { origin, x, y };
        self.previous = std::mem::replace(&mut self.last, last);
    }

    pub fn delta_x_start(&self) -> f64 {
        self.last.x - self.start.x
    }

    pub fn delta_y_start(&self) -> f64 {
        self.last.y - self.start.y
    }

    pub fn delta_x_previous(&self) -> f64 {
        self.last.x - self.previous.x
    }

    pub fn delta_y_previous(&self) -> f64 {
        self.last.y - self.previous.y
    }

    /// The raw event that started the gesture, if any.
    pub fn start_input(&self) -> Option<&PointerInput> {
        self.start.origin.as_ref()
    }

    /// Ended because a second contact took over, not by a pointer-up.
    pub fn is_superseded(&self) -> bool {
        self.last.origin.is_none()
    }
}

/// Distance and angle between the two contacts of a double-pointer gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSnapshot {
    pub origin: Option<PointerInput>,
    pub distance: f64,
    /// Degrees from the lower-id contact to the higher-id one.
    pub angle: f64,
    /// Midpoint of the two contacts, in screen pixels.
    pub center: Point,
}

/// A gesture made with exactly two pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct DoublePointerEvent {
    pub start: PairSnapshot,
    pub previous: PairSnapshot,
    pub last: PairSnapshot,
}

impl DoublePointerEvent {
    pub fn new(pair: PairSnapshot) -> Self {
        Self {
            start: pair.clone(),
            previous: pair.clone(),
            last: pair,
        }
    }

    pub fn update(&mut self, pair: PairSnapshot) {
        self.previous = std::mem::replace(&mut self.last, pair);
    }

    pub fn delta_distance_start(&self) -> f64 {
        self.last.distance - self.start.distance
    }

    pub fn delta_distance_previous(&self) -> f64 {
        self.last.distance - self.previous.distance
    }

    pub fn delta_angle_start(&self) -> f64 {
        wrap_angle_delta(self.last.angle - self.start.angle)
    }

    pub fn delta_angle_previous(&self) -> f64 {
        wrap_angle_delta(self.last.angle - self.previous.angle)
    }
}

// ─── Tracker ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct ActivePointer {
    pointer_id: i32,
    /// Last processed position.
    position: Point,
    last_move_ms: f64,
    input: PointerInput,
}

#[derive(Debug, Clone, Copy)]
struct PotentialClick {
    pointer_id: i32,
    start_ms: f64,
    start: Point,
}

/// A synthetic click waiting for its deadline. A real click clears it.
#[derive(Debug, Clone)]
struct PendingClick {
    deadline_ms: f64,
    click: ClickInput,
}

/// What one raw pointer event produced.
#[derive(Debug, Clone, Default)]
pub struct TrackerStep {
    /// Gestures to dispatch, in order.
    pub gestures: SmallVec<[Gesture; 2]>,
    /// The host should capture the pointer on the event target.
    pub capture: bool,
    /// The event belongs to a tracked pointer.
    pub tracked: bool,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    pointers: SmallVec<[ActivePointer; MAX_POINTERS]>,
    single: Option<SinglePointerEvent>,
    double: Option<DoublePointerEvent>,
    potential_click: Option<PotentialClick>,
    pending_click: Option<PendingClick>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked contacts (0, 1 or 2).
    pub fn active_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn single(&self) -> Option<&SinglePointerEvent> {
        self.single.as_ref()
    }

    pub fn double(&self) -> Option<&DoublePointerEvent> {
        self.double.as_ref()
    }

    /// Deadline of the armed synthetic click, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        self.pending_click.as_ref().map(|p| p.deadline_ms)
    }

    pub fn is_waiting_for_click(&self) -> bool {
        self.pending_click.is_some()
    }

    pub fn pointer_down(&mut self, input: &PointerInput) -> TrackerStep {
        let mut step = TrackerStep::default();

        if !input.is_primary_interaction() {
            return step;
        }
        if self.index_of(input.pointer_id).is_some() {
            return step;
        }
        if self.pointers.len() >= MAX_POINTERS {
            log::debug!(
                "ignoring pointer {} ({} already down)",
                input.pointer_id,
                self.pointers.len()
            );
            return step;
        }

        self.pointers.push(ActivePointer {
            pointer_id: input.pointer_id,
            position: input.position(),
            last_move_ms: input.time_ms,
            input: input.clone(),
        });
        step.tracked = true;
        step.capture = true;

        match self.pointers.len() {
            1 => {
                let single = SinglePointerEvent::new(Some(input.clone()), input.x, input.y);
                step.gestures.push(Gesture::SingleStart(single.clone()));
                self.single = Some(single);
                self.potential_click = Some(PotentialClick {
                    pointer_id: input.pointer_id,
                    start_ms: input.time_ms,
                    start: input.position(),
                });
            }
            _ => {
                if let Some(mut single) = self.single.take() {
                    let last = single.last.point();
                    single.update(None, last.x, last.y);
                    step.gestures.push(Gesture::SingleEnd(single));
                }
                self.potential_click = None;
                if let Some(pair) = self.pair_snapshot(Some(input.clone())) {
                    let double = DoublePointerEvent::new(pair);
                    step.gestures.push(Gesture::DoubleStart(double.clone()));
                    self.double = Some(double);
                }
            }
        }
        step
    }

    pub fn pointer_move(&mut self, input: &PointerInput, config: &GestureConfig) -> TrackerStep {
        let mut step = TrackerStep::default();
        let Some(index) = self.index_of(input.pointer_id) else {
            return step;
        };
        step.tracked = true;

        let pointer = &mut self.pointers[index];
        if input.time_ms - pointer.last_move_ms < config.move_flood_ms {
            return step;
        }
        let dx = (input.x - pointer.position.x).abs();
        let dy = (input.y - pointer.position.y).abs();
        if dx < config.move_threshold_px && dy < config.move_threshold_px {
            return step;
        }

        pointer.position = input.position();
        pointer.last_move_ms = input.time_ms;
        pointer.input = input.clone();

        match self.pointers.len() {
            1 => {
                if let Some(single) = self.single.as_mut() {
                    single.update(Some(input.clone()), input.x, input.y);
                    step.gestures.push(Gesture::SingleMove(single.clone()));
                }
            }
            _ => {
                let pair = self.pair_snapshot(Some(input.clone()));
                if let (Some(double), Some(pair)) = (self.double.as_mut(), pair) {
                    double.update(pair);
                    step.gestures.push(Gesture::DoubleMove(double.clone()));
                }
            }
        }
        step
    }

    pub fn pointer_up(&mut self, input: &PointerInput, config: &GestureConfig) -> TrackerStep {
        let mut step = TrackerStep::default();
        let Some(index) = self.index_of(input.pointer_id) else {
            return step;
        };
        step.tracked = true;
        self.pointers.remove(index);

        match self.pointers.len() {
            0 => {
                if let Some(mut single) = self.single.take() {
                    single.update(Some(input.clone()), input.x, input.y);
                    step.gestures.push(Gesture::SingleEnd(single));
                }
                self.double = None;
                self.arm_click_if_tap(input, config);
            }
            _ => {
                if let Some(double) = self.double.take() {
                    step.gestures.push(Gesture::DoubleEnd(double));
                }
                let remaining = &self.pointers[0];
                let single = SinglePointerEvent::new(
                    Some(remaining.input.clone()),
                    remaining.position.x,
                    remaining.position.y,
                );
                step.gestures.push(Gesture::SingleStart(single.clone()));
                self.single = Some(single);
            }
        }
        step
    }

    /// A cancel forces the gesture to complete exactly like an up.
    pub fn pointer_cancel(&mut self, input: &PointerInput, config: &GestureConfig) -> TrackerStep {
        self.pointer_up(input, config)
    }

    /// A native click arrived: the armed synthetic click is no longer needed.
    pub fn real_click(&mut self) {
        if self.pending_click.take().is_some() {
            log::trace!("native click arrived, synthetic click dropped");
        }
    }

    /// Fire the synthetic click once its deadline has passed.
    pub fn take_due_click(&mut self, now_ms: f64) -> Option<ClickInput> {
        match &self.pending_click {
            Some(pending) if now_ms >= pending.deadline_ms => {
                let click = self.pending_click.take().map(|p| p.click);
                log::debug!("synthesizing click");
                click
            }
            _ => None,
        }
    }

    fn arm_click_if_tap(&mut self, input: &PointerInput, config: &GestureConfig) {
        let Some(potential) = self.potential_click.take() else {
            return;
        };
        if potential.pointer_id != input.pointer_id {
            return;
        }
        let elapsed = input.time_ms - potential.start_ms;
        let moved = distance(potential.start, input.position());
        if elapsed < config.click_max_ms && moved < config.click_max_px {
            self.pending_click = Some(PendingClick {
                deadline_ms: input.time_ms + config.synthetic_click_delay_ms,
                click: ClickInput {
                    x: input.x,
                    y: input.y,
                    time_ms: input.time_ms,
                    target: input.target.clone(),
                    synthetic: true,
                },
            });
        }
    }

    fn index_of(&self, pointer_id: i32) -> Option<usize> {
        self.pointers.iter().position(|p| p.pointer_id == pointer_id)
    }

    /// Pair geometry with contacts ordered by pointer id, so the two roles
    /// never swap between frames.
    fn pair_snapshot(&self, origin: Option<PointerInput>) -> Option<PairSnapshot> {
        let [a, b] = match self.pointers.as_slice() {
            [a, b] if a.pointer_id <= b.pointer_id => [a, b],
            [a, b] => [b, a],
            _ => return None,
        };
        Some(PairSnapshot {
            origin,
            distance: distance(a.position, b.position),
            angle: angle(a.position, b.position),
            center: a.position.midpoint(b.position),
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
