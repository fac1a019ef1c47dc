pub mod geometry;
pub mod transform;
pub mod viewbox;

pub use geometry::{
    PixelScale, angle, distance, normalize_angle, pixels_per_svg_unit, rotate_vector,
    rotated_bounding_box, screen_to_svg_point, wrap_angle_delta,
};
pub use transform::{
    Rotate, Scale, TransformState, Translate, compose_transform, parse_transform,
    parse_transform_with,
};
pub use viewbox::ViewBox;

// Re-export kurbo types so downstream crates don't need a direct dependency
pub use kurbo::{Affine, Point, Rect, Vec2};
