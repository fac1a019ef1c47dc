//! Integration tests: map pan/zoom/rotate through a full gesture session.
//!
//! Drives `GestureSession` with raw pointer, wheel, click and key input over
//! an in-memory surface, and checks the DOM writes and the POSTs that come
//! out the other end.

use hi_core::{Affine, Rect, ViewBox, parse_transform, wrap_angle_delta};
use hi_editor::config::GestureConfig;
use hi_editor::host::{GeometryPayload, Surface};
use hi_editor::input::{ClickInput, ElementId, KeyInput, PointerInput, PointerKind, TargetInfo, WheelInput};
use hi_editor::selection::Selection;
use hi_editor::session::GestureSession;
use hi_editor::shortcuts::GestureMode;
use hi_editor::testing::{MemorySurface, RecordingTransport};

const SVG: &str = "hi-location-view-svg";
const PANEL: &str = "hi-location-view-geometry";
const VIEW_URL: &str = "/location/edit/location-view/geometry";

type Session = GestureSession<MemorySurface, RecordingTransport>;

/// 500×500 px map showing the top-left quarter of a 1000×1000 plan.
fn session() -> Session {
    let surface = MemorySurface::new()
        .with_attribute(SVG, "viewBox", "0 0 500 500")
        .with_attribute(SVG, "data-extents", "0 0 1000 1000")
        .with_rect(SVG, Rect::new(0.0, 0.0, 500.0, 500.0))
        .with_matrix(SVG, Affine::IDENTITY)
        .with_visible(PANEL);
    GestureSession::new(surface, RecordingTransport::new(), GestureConfig::default())
}

fn mouse(x: f64, y: f64, time_ms: f64) -> PointerInput {
    PointerInput {
        pointer_id: 1,
        kind: PointerKind::Mouse,
        buttons: 1,
        x,
        y,
        time_ms,
        target: TargetInfo::default(),
    }
}

fn touch(pointer_id: i32, x: f64, y: f64, time_ms: f64) -> PointerInput {
    PointerInput {
        pointer_id,
        kind: PointerKind::Touch,
        buttons: 0,
        x,
        y,
        time_ms,
        target: TargetInfo::default(),
    }
}

fn wheel(delta_y: f64, time_ms: f64) -> WheelInput {
    WheelInput {
        x: 250.0,
        y: 250.0,
        delta_y,
        time_ms,
    }
}

fn click(x: f64, y: f64, time_ms: f64) -> ClickInput {
    ClickInput {
        x,
        y,
        time_ms,
        target: TargetInfo::default(),
        synthetic: false,
    }
}

fn view_box(session: &Session) -> ViewBox {
    session
        .surface()
        .attr(SVG, "viewBox")
        .and_then(ViewBox::parse)
        .expect("viewBox attribute")
}

fn rotation(session: &Session) -> f64 {
    parse_transform(session.surface().attr(SVG, "transform"))
        .rotate
        .angle
}

fn assert_view(actual: ViewBox, expected: [f64; 4]) {
    let got = [actual.x, actual.y, actual.width, actual.height];
    for (a, e) in got.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "viewBox {got:?} != {expected:?}");
    }
}

fn select_map(session: &mut Session) {
    let outcome = session.click(&click(250.0, 250.0, 0.0));
    assert!(outcome.handled);
    assert_eq!(session.selection(), Selection::LocationView);
}

// ─── Pan ────────────────────────────────────────────────────────────────

#[test]
fn drag_pans_view_against_pointer() {
    let mut s = session();
    let down = s.pointer_down(&mouse(100.0, 100.0, 0.0));
    assert!(down.handled);
    assert!(down.capture_pointer);
    assert!(down.stop_propagation);

    let moved = s.pointer_move(&mouse(50.0, 70.0, 20.0));
    assert!(moved.handled);
    assert!(moved.prevent_default);
    assert_view(view_box(&s), [50.0, 30.0, 500.0, 500.0]);

    s.pointer_up(&mouse(50.0, 70.0, 40.0));
    assert_eq!(s.next_deadline(), Some(440.0));
}

#[test]
fn pan_is_clamped_to_extents() {
    let mut s = session();
    s.pointer_down(&mouse(100.0, 100.0, 0.0));
    // Dragging right would move the window left of the plan's edge
    s.pointer_move(&mouse(300.0, 100.0, 20.0));
    assert_view(view_box(&s), [0.0, 0.0, 500.0, 500.0]);
}

#[test]
fn pan_follows_rotation() {
    let mut s = session();
    s.surface_mut().set_attribute(
        &ElementId::from(SVG),
        "transform",
        "scale(1 1) translate(0, 0) rotate(90, 250, 250)",
    );
    s.pointer_down(&mouse(100.0, 100.0, 0.0));
    // A horizontal drag on a map turned 90° moves the window vertically
    s.pointer_move(&mouse(150.0, 100.0, 20.0));
    assert_view(view_box(&s), [0.0, 50.0, 500.0, 500.0]);
}

#[test]
fn pan_persists_once_after_debounce() {
    let mut s = session();
    s.pointer_down(&mouse(100.0, 100.0, 0.0));
    s.pointer_move(&mouse(50.0, 70.0, 20.0));
    s.pointer_up(&mouse(50.0, 70.0, 40.0));

    s.tick(439.0);
    assert!(s.transport().posts.is_empty());
    s.tick(440.0);
    assert_eq!(
        s.transport().posts,
        vec![(
            VIEW_URL.to_string(),
            GeometryPayload::ViewGeometry {
                svg_view_box_str: "50 30 500 500".to_string(),
                svg_rotate: 0.0,
            }
        )]
    );
    s.tick(2000.0);
    assert_eq!(s.transport().posts.len(), 1);
}

#[test]
fn click_after_drag_does_not_select() {
    let mut s = session();
    s.pointer_down(&mouse(100.0, 100.0, 0.0));
    s.pointer_move(&mouse(50.0, 70.0, 20.0));
    s.pointer_up(&mouse(50.0, 70.0, 40.0));
    let outcome = s.click(&click(50.0, 70.0, 41.0));
    assert!(outcome.handled);
    assert_eq!(s.selection(), Selection::None);
}

#[test]
fn stale_drag_does_not_swallow_later_click() {
    let mut s = session();
    s.pointer_down(&mouse(100.0, 100.0, 0.0));
    s.pointer_move(&mouse(50.0, 70.0, 20.0));
    // Released with no native click following
    s.pointer_up(&mouse(50.0, 70.0, 40.0));

    let outcome = s.click(&click(250.0, 250.0, 2000.0));
    assert!(outcome.handled);
    assert_eq!(s.selection(), Selection::LocationView);
}

#[test]
fn hidden_geometry_panel_blocks_persistence() {
    let mut s = session();
    s.surface_mut().set_visible(PANEL, false);
    s.pointer_down(&mouse(100.0, 100.0, 0.0));
    s.pointer_move(&mouse(50.0, 70.0, 20.0));
    s.pointer_up(&mouse(50.0, 70.0, 40.0));
    s.tick(1000.0);
    assert!(s.transport().posts.is_empty());
    // The view itself still moved
    assert_view(view_box(&s), [50.0, 30.0, 500.0, 500.0]);
}

#[test]
fn failed_post_is_not_fatal() {
    let mut s = session();
    s.transport_mut().fail = true;
    s.pointer_down(&mouse(100.0, 100.0, 0.0));
    s.pointer_move(&mouse(50.0, 70.0, 20.0));
    s.pointer_up(&mouse(50.0, 70.0, 40.0));
    s.tick(1000.0);
    assert_eq!(s.transport().posts.len(), 1);
    assert_view(view_box(&s), [50.0, 30.0, 500.0, 500.0]);
}

// ─── Zoom ───────────────────────────────────────────────────────────────

#[test]
fn pinch_apart_zooms_in() {
    let mut s = session();
    s.pointer_down(&touch(1, 200.0, 250.0, 0.0));
    s.pointer_down(&touch(2, 300.0, 250.0, 0.0));
    // Distance 100 → 150: factor 1 - 50/250 = 0.8
    let moved = s.pointer_move(&touch(2, 350.0, 250.0, 20.0));
    assert!(moved.handled);
    assert_view(view_box(&s), [50.0, 50.0, 400.0, 400.0]);

    s.pointer_up(&touch(2, 350.0, 250.0, 40.0));
    s.pointer_up(&touch(1, 200.0, 250.0, 60.0));
    s.tick(440.0);
    assert_eq!(s.transport().posts.len(), 1);
}

#[test]
fn pinch_is_incremental_against_previous_frame() {
    let mut s = session();
    s.pointer_down(&touch(1, 200.0, 250.0, 0.0));
    s.pointer_down(&touch(2, 300.0, 250.0, 0.0));
    s.pointer_move(&touch(2, 350.0, 250.0, 20.0));
    // Each frame scales by its own change in spread
    s.pointer_move(&touch(1, 150.0, 250.0, 40.0));
    s.pointer_move(&touch(1, 200.0, 250.0, 60.0));
    let after = view_box(&s);
    // 0.8, then 1 - 50/250 again, then 1 + 50/250
    let expected = 500.0 * 0.8 * 0.8 * 1.2;
    assert!((after.width - expected).abs() < 1e-6, "{after:?}");
}

#[test]
fn wheel_zooms_and_coalesces_persistence() {
    let mut s = session();
    for notch in 0..8 {
        let outcome = s.wheel(&wheel(100.0, notch as f64 * 50.0));
        assert!(outcome.handled);
        assert!(outcome.prevent_default);
    }
    // 500 × 1.1^8 exceeds the 1000-unit plan: clamped to the extents
    assert_view(view_box(&s), [0.0, 0.0, 1000.0, 1000.0]);

    s.tick(700.0);
    assert!(s.transport().posts.is_empty());
    s.tick(750.0);
    assert_eq!(s.transport().posts.len(), 1);
}

#[test]
fn wheel_up_zooms_in() {
    let mut s = session();
    s.wheel(&wheel(-100.0, 0.0));
    assert_view(view_box(&s), [25.0, 25.0, 450.0, 450.0]);
}

#[test]
fn wheel_outside_map_is_ignored() {
    let mut s = session();
    let outcome = s.wheel(&WheelInput {
        x: 800.0,
        y: 250.0,
        delta_y: 100.0,
        time_ms: 0.0,
    });
    assert!(!outcome.handled);
    assert_view(view_box(&s), [0.0, 0.0, 500.0, 500.0]);
}

#[test]
fn plus_minus_keys_zoom_selected_map() {
    let mut s = session();
    // Not selected yet
    assert!(!s.key_down(&KeyInput::plain("+"), 0.0).handled);

    select_map(&mut s);
    assert!(s.key_down(&KeyInput::plain("+"), 10.0).handled);
    assert_view(view_box(&s), [25.0, 25.0, 450.0, 450.0]);
    assert!(s.key_down(&KeyInput::plain("-"), 20.0).handled);
    assert!((view_box(&s).width - 450.0 * 1.1).abs() < 1e-6);
}

// ─── Rotate ─────────────────────────────────────────────────────────────

#[test]
fn rotate_mode_keys_turn_map_and_mirror_css() {
    let mut s = session();
    select_map(&mut s);
    assert!(s.key_down(&KeyInput::plain("r"), 10.0).handled);
    assert_eq!(s.dispatcher().location.mode(), GestureMode::Rotate);

    s.key_down(&KeyInput::plain("+"), 20.0);
    assert_eq!(rotation(&s), 10.0);
    assert_eq!(s.surface().style(SVG, "transform"), Some("rotate(10deg)"));

    // Rotation is kept in [0, 360)
    s.key_down(&KeyInput::plain("-"), 30.0);
    s.key_down(&KeyInput::plain("-"), 40.0);
    assert_eq!(rotation(&s), 350.0);
    assert_eq!(s.surface().style(SVG, "transform"), Some("rotate(350deg)"));
}

#[test]
fn wheel_in_rotate_mode_turns_by_small_steps() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("r"), 10.0);
    s.wheel(&wheel(-100.0, 20.0));
    assert_eq!(rotation(&s), 3.0);
    // Size untouched
    assert_view(view_box(&s), [0.0, 0.0, 500.0, 500.0]);
}

#[test]
fn rotation_center_tracks_view_center() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("r"), 10.0);
    s.key_down(&KeyInput::plain("+"), 20.0);
    let rotate = parse_transform(s.surface().attr(SVG, "transform")).rotate;
    assert_eq!((rotate.cx, rotate.cy), (250.0, 250.0));
}

#[test]
fn escape_reverts_rotation_and_leaves_mode() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("r"), 10.0);
    s.key_down(&KeyInput::plain("+"), 20.0);
    s.key_down(&KeyInput::plain("+"), 30.0);
    assert_eq!(rotation(&s), 20.0);

    assert!(s.key_down(&KeyInput::plain("Escape"), 40.0).handled);
    assert_eq!(rotation(&s), 0.0);
    assert_eq!(s.dispatcher().location.mode(), GestureMode::Move);
    assert_eq!(s.next_deadline(), None);
    s.tick(10_000.0);
    assert!(s.transport().posts.is_empty());
}

#[test]
fn pointer_up_commits_and_leaves_mode() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("s"), 10.0);
    assert_eq!(s.dispatcher().location.mode(), GestureMode::Scale);

    // Moving away from the map center zooms in
    s.pointer_down(&mouse(300.0, 250.0, 100.0));
    s.pointer_move(&mouse(400.0, 250.0, 120.0));
    assert!(view_box(&s).width < 500.0);
    s.pointer_up(&mouse(400.0, 250.0, 140.0));
    assert_eq!(s.dispatcher().location.mode(), GestureMode::Move);

    s.tick(540.0);
    assert_eq!(s.transport().posts.len(), 1);
}

#[test]
fn key_steps_in_mode_are_not_saved_before_escape() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("r"), 10.0);
    s.key_down(&KeyInput::plain("+"), 20.0);
    assert_eq!(rotation(&s), 10.0);

    // Waiting past the debounce window saves nothing while the mode is open
    assert_eq!(s.next_deadline(), None);
    s.tick(500.0);
    assert!(s.transport().posts.is_empty());

    s.key_down(&KeyInput::plain("Escape"), 600.0);
    s.tick(5000.0);
    assert!(s.transport().posts.is_empty());
    assert_eq!(rotation(&s), 0.0);
}

#[test]
fn wheel_steps_in_mode_are_not_saved_before_escape() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("s"), 10.0);
    s.wheel(&wheel(-100.0, 20.0));
    assert_view(view_box(&s), [25.0, 25.0, 450.0, 450.0]);
    s.tick(500.0);
    assert!(s.transport().posts.is_empty());

    s.key_down(&KeyInput::plain("Escape"), 600.0);
    s.tick(5000.0);
    assert!(s.transport().posts.is_empty());
    assert_view(view_box(&s), [0.0, 0.0, 500.0, 500.0]);
}

#[test]
fn key_steps_in_mode_are_saved_on_pointer_up() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("r"), 10.0);
    s.key_down(&KeyInput::plain("+"), 20.0);

    s.pointer_down(&mouse(250.0, 250.0, 100.0));
    s.pointer_up(&mouse(250.0, 250.0, 110.0));
    assert_eq!(s.dispatcher().location.mode(), GestureMode::Move);

    s.tick(510.0);
    assert_eq!(
        s.transport().posts,
        vec![(
            VIEW_URL.to_string(),
            GeometryPayload::ViewGeometry {
                svg_view_box_str: "0 0 500 500".to_string(),
                svg_rotate: 10.0,
            }
        )]
    );
}

#[test]
fn save_armed_before_mode_survives_escape() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("+"), 10.0);
    s.key_down(&KeyInput::plain("r"), 20.0);
    s.key_down(&KeyInput::plain("Escape"), 30.0);

    s.tick(410.0);
    assert_eq!(
        s.transport().posts,
        vec![(
            VIEW_URL.to_string(),
            GeometryPayload::ViewGeometry {
                svg_view_box_str: "25 25 450 450".to_string(),
                svg_rotate: 0.0,
            }
        )]
    );
}

/// Contact at `radius` px from `from`, in direction `degrees`.
fn polar(from: (f64, f64), radius: f64, degrees: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (from.0 + radius * radians.cos(), from.1 + radius * radians.sin())
}

fn assert_rotation(session: &Session, expected: f64) {
    let got = rotation(session);
    assert!(
        wrap_angle_delta(got - expected).abs() < 1e-6,
        "rotation {got} != {expected}"
    );
}

#[test]
fn twist_rotates_by_half_the_angle_change() {
    let mut s = session();
    s.pointer_down(&touch(1, 200.0, 250.0, 0.0));
    s.pointer_down(&touch(2, 300.0, 250.0, 0.0));

    // Same spread, turned 45° counter-clockwise on screen
    let (x, y) = polar((200.0, 250.0), 100.0, -45.0);
    assert!(s.pointer_move(&touch(2, x, y, 20.0)).handled);
    // -22.5 wraps into [0, 360)
    assert_rotation(&s, 337.5);
    assert!((view_box(&s).width - 500.0).abs() < 1e-6);

    s.pointer_up(&touch(2, x, y, 40.0));
    s.pointer_up(&touch(1, 200.0, 250.0, 60.0));
    s.tick(460.0);
    assert_eq!(s.transport().posts.len(), 1);
}

#[test]
fn twist_across_the_half_turn_seam_is_small() {
    let mut s = session();
    // Second contact directly left of the first: pair angle 180
    s.pointer_down(&touch(1, 300.0, 250.0, 0.0));
    s.pointer_down(&touch(2, 200.0, 250.0, 0.0));

    // Pair angle 180 → -170 is a 10° turn, not -350°
    let (x, y) = polar((300.0, 250.0), 100.0, 190.0);
    s.pointer_move(&touch(2, x, y, 20.0));
    assert_rotation(&s, 5.0);

    // And back across the seam
    s.pointer_move(&touch(2, 200.0, 250.0, 40.0));
    assert_rotation(&s, 0.0);
}

#[test]
fn rotate_mode_drag_turns_around_map_center() {
    let mut s = session();
    select_map(&mut s);
    s.key_down(&KeyInput::plain("r"), 10.0);
    s.key_down(&KeyInput::plain("-"), 20.0);
    assert_rotation(&s, 350.0);

    // A quarter turn around the center (250, 250), damped by half
    s.pointer_down(&mouse(350.0, 250.0, 100.0));
    s.pointer_move(&mouse(250.0, 350.0, 120.0));
    assert_rotation(&s, 35.0);
    // Size untouched
    assert!((view_box(&s).width - 500.0).abs() < 1e-6);

    s.pointer_up(&mouse(250.0, 350.0, 140.0));
    assert_eq!(s.dispatcher().location.mode(), GestureMode::Move);
    s.tick(540.0);
    let posts = &s.transport().posts;
    assert_eq!(posts.len(), 1);
    match &posts[0].1 {
        GeometryPayload::ViewGeometry { svg_rotate, .. } => {
            assert!((svg_rotate - 35.0).abs() < 1e-6, "{svg_rotate}");
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

// ─── Keyboard exclusions ────────────────────────────────────────────────

#[test]
fn keys_in_text_inputs_and_modals_are_ignored() {
    let mut s = session();
    select_map(&mut s);

    let mut typing = KeyInput::plain("r");
    typing.target.is_text_input = true;
    assert!(!s.key_down(&typing, 10.0).handled);

    let mut dialog = KeyInput::plain("s");
    dialog.target.in_modal = true;
    assert!(!s.key_down(&dialog, 20.0).handled);

    assert_eq!(s.dispatcher().location.mode(), GestureMode::Move);
}

#[test]
fn browser_shortcuts_are_left_alone() {
    let mut s = session();
    select_map(&mut s);
    let mut save = KeyInput::plain("s");
    save.ctrl = true;
    assert!(!s.key_down(&save, 10.0).handled);
}
