//! Stateless geometry helpers for the location-view SVG.
//!
//! All angles are in degrees. Screen coordinates are CSS pixels as reported
//! by pointer events (`clientX`/`clientY`); SVG coordinates are user units of
//! the base `<svg>` element.
//!
//! None of these functions guard against NaN or singular matrices: a
//! malformed input produces NaN output, and callers see "no effect" rather
//! than an error.

use kurbo::{Affine, Point, Rect, Vec2};

/// Straight-line distance between two points.
pub fn distance(p1: Point, p2: Point) -> f64 {
    (p2 - p1).hypot()
}

/// Direction from `p1` to `p2` in degrees, in the range (-180, 180].
pub fn angle(p1: Point, p2: Point) -> f64 {
    let delta = p2 - p1;
    let degrees = delta.y.atan2(delta.x).to_degrees();
    if degrees <= -180.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Bring any angle into [0, 360).
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Bring an angle difference into (-180, 180].
///
/// Two successive `angle()` readings on either side of the ±180 seam differ
/// by nearly 360 even though the pointer barely moved.
pub fn wrap_angle_delta(delta: f64) -> f64 {
    let wrapped = normalize_angle(delta);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Rotate a vector counter-clockwise (in SVG's y-down frame: clockwise on
/// screen) by `degrees`.
pub fn rotate_vector(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Axis-aligned bounding box of `rect` after rotating it about its own
/// center by `degrees`.
pub fn rotated_bounding_box(rect: Rect, degrees: f64) -> Rect {
    let center = rect.center();
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];

    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for corner in corners {
        let p = center + rotate_vector(corner - center, degrees);
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Rect::new(min.x, min.y, max.x, max.y)
}

/// Map a screen coordinate into the user space of an SVG element.
///
/// `screen_matrix` is the element's current screen transform (what the DOM
/// reports as `getScreenCTM()`), mapping user units to CSS pixels.
pub fn screen_to_svg_point(screen_matrix: Affine, client_x: f64, client_y: f64) -> Point {
    screen_matrix.inverse() * Point::new(client_x, client_y)
}

/// How many screen pixels one SVG user unit covers along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Derive the pixels-per-unit ratio from a screen transform matrix.
///
/// Uses the length of each basis column, which equals the matrix diagonal
/// `(a, d)` when the element is unrotated and stays finite when it is.
pub fn pixels_per_svg_unit(screen_matrix: Affine) -> PixelScale {
    let [a, b, c, d, _, _] = screen_matrix.as_coeffs();
    PixelScale {
        scale_x: Vec2::new(a, b).hypot(),
        scale_y: Vec2::new(c, d).hypot(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
