//! SVG `transform` attribute parsing and composition.
//!
//! Every manipulated element (the base map `<svg>` or an icon `<g>`) carries
//! its state as `scale(sx sy) translate(tx, ty) rotate(angle, cx, cy)`,
//! always composed in that order. The rotation center is absolute and is not
//! compounded with the scale or translation.
//!
//! Parsing scans the string independently for each function kind, so the
//! order in which functions appear does not matter; the last occurrence of
//! each kind wins. Missing kinds keep the caller-supplied default.
//!
//! Built on `winnow` 0.7.

use serde::{Deserialize, Serialize};
use std::fmt;
use winnow::ascii::space0;
use winnow::combinator::{alt, delimited};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_till;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

/// Translation. A single-argument `translate(n)` leaves `y` as NaN, which
/// callers treat as "unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotate {
    pub angle: f64,
    pub cx: f64,
    pub cy: f64,
}

/// The three transform components of one SVG element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: Scale,
    pub translate: Translate,
    pub rotate: Rotate,
}

impl TransformState {
    /// Defaults for icons: a freshly placed icon sits at (100, 100).
    pub const ICON_DEFAULT: TransformState = TransformState {
        scale: Scale { x: 1.0, y: 1.0 },
        translate: Translate { x: 100.0, y: 100.0 },
        rotate: Rotate {
            angle: 0.0,
            cx: 0.0,
            cy: 0.0,
        },
    };

    /// Defaults for the base map, which must not pick up the icon offset.
    pub const IDENTITY: TransformState = TransformState {
        scale: Scale { x: 1.0, y: 1.0 },
        translate: Translate { x: 0.0, y: 0.0 },
        rotate: Rotate {
            angle: 0.0,
            cx: 0.0,
            cy: 0.0,
        },
    };

    /// Serialize back into `transform` attribute syntax.
    pub fn compose(&self) -> String {
        compose_transform(&self.scale, &self.translate, &self.rotate)
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::ICON_DEFAULT
    }
}

impl fmt::Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

/// Parse a transform attribute using the icon defaults.
pub fn parse_transform(input: Option<&str>) -> TransformState {
    parse_transform_with(input, &TransformState::ICON_DEFAULT)
}

/// Parse a transform attribute, falling back to `defaults` for each
/// function kind that does not appear.
pub fn parse_transform_with(input: Option<&str>, defaults: &TransformState) -> TransformState {
    let mut state = *defaults;
    let Some(mut rest) = input else {
        return state;
    };

    while !rest.is_empty() {
        let checkpoint = rest;
        match transform_function.parse_next(&mut rest) {
            Ok((kind, args)) => apply_function(&mut state, kind, args),
            Err(_) => {
                rest = checkpoint;
                let mut chars = rest.chars();
                chars.next();
                rest = chars.as_str();
            }
        }
    }

    state
}

/// Emit `scale(sx sy) translate(tx, ty) rotate(angle, cx, cy)`.
pub fn compose_transform(scale: &Scale, translate: &Translate, rotate: &Rotate) -> String {
    format!(
        "scale({} {}) translate({}, {}) rotate({}, {}, {})",
        scale.x, scale.y, translate.x, translate.y, rotate.angle, rotate.cx, rotate.cy
    )
}

// ─── Low-level parsers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    Scale,
    Translate,
    Rotate,
}

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    let _: Result<&str, winnow::error::ErrMode<ContextError>> = space0.parse_next(input);
}

fn transform_function<'a>(input: &mut &'a str) -> ModalResult<(FunctionKind, &'a str)> {
    let kind = alt((
        "scale".value(FunctionKind::Scale),
        "translate".value(FunctionKind::Translate),
        "rotate".value(FunctionKind::Rotate),
    ))
    .parse_next(input)?;
    skip_space(input);
    let args = delimited('(', take_till(0.., ')'), ')').parse_next(input)?;
    Ok((kind, args))
}

fn apply_function(state: &mut TransformState, kind: FunctionKind, args: &str) {
    let values: Vec<f64> = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(parse_number)
        .collect();
    let arg = |i: usize| values.get(i).copied();
    let first = arg(0).unwrap_or(f64::NAN);

    match kind {
        FunctionKind::Scale => {
            state.scale = Scale {
                x: first,
                y: arg(1).unwrap_or(first),
            };
        }
        FunctionKind::Translate => {
            state.translate = Translate {
                x: first,
                y: arg(1).unwrap_or(f64::NAN),
            };
        }
        FunctionKind::Rotate => {
            state.rotate = Rotate {
                angle: first,
                cx: arg(1).unwrap_or(0.0),
                cy: arg(2).unwrap_or(0.0),
            };
        }
    }
}

fn parse_number(token: &str) -> f64 {
    token.parse::<f64>().unwrap_or_else(|_| {
        log::trace!("malformed transform number {token:?}");
        f64::NAN
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────
