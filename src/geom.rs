//! Affine transforms, bounds, and the segment representation shared by the
//! path interpreter and the geometry adapter.

/// A 2D affine transform:
///
/// ```text
/// | a c e |
/// | b d f |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Rotation by `rad` radians about the pivot (px, py).
    pub fn rotate_about(rad: f64, px: f64, py: f64) -> Self {
        let s = libm::sin(rad);
        let c = libm::cos(rad);
        Self {
            a: c,
            b: s,
            c: -s,
            d: c,
            e: px - c * px + s * py,
            f: py - s * px - c * py,
        }
    }

    /// [self] * [other]: `other` applies first.
    pub fn mul(self, other: Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn is_identity(self) -> bool {
        self == Affine::IDENTITY
    }
}

/// An axis-aligned bounding box in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    };

    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(self) -> f64 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(self) -> f64 {
        (self.max_y - self.min_y).max(0.0)
    }

    pub fn center(self) -> (f64, f64) {
        (
            (self.max_x - self.min_x) / 2.0 + self.min_x,
            (self.max_y - self.min_y) / 2.0 + self.min_y,
        )
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn translated(self, dx: f64, dy: f64) -> Bounds {
        Bounds {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

/// One piece of a vector outline.
///
/// The first segment of a non-empty path is always `MoveTo`.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    QuadTo {
        cx: f64,
        cy: f64,
        x: f64,
        y: f64,
    },
    CurveTo {
        cx1: f64,
        cy1: f64,
        cx2: f64,
        cy2: f64,
        x: f64,
        y: f64,
    },
    /// A solved elliptical arc in center parameterization. The arc runs along
    /// `(cx + rx*cos t, cy + ry*sin t)` (y-down frame) for `t` from
    /// `start_deg` to `start_deg + extent_deg`; `rotation_rad != 0`
    /// additionally rotates the materialized arc about the ellipse center.
    ArcTo {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        start_deg: f64,
        extent_deg: f64,
        rotation_rad: f64,
    },
    Close,
}

/// Bounding box of a segment list, tracking end and control points. Returns
/// None for an empty or fully degenerate list.
pub fn segments_bounds(segments: &[Segment]) -> Option<Bounds> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let mut grow = |x: f64, y: f64| {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    };

    for seg in segments {
        match *seg {
            Segment::MoveTo { x, y } | Segment::LineTo { x, y } => grow(x, y),
            Segment::QuadTo { cx, cy, x, y } => {
                grow(cx, cy);
                grow(x, y);
            }
            Segment::CurveTo {
                cx1,
                cy1,
                cx2,
                cy2,
                x,
                y,
            } => {
                grow(cx1, cy1);
                grow(cx2, cy2);
                grow(x, y);
            }
            Segment::ArcTo {
                cx, cy, rx, ry, ..
            } => {
                grow(cx - rx, cy - ry);
                grow(cx + rx, cy + ry);
            }
            Segment::Close => {}
        }
    }

    if !min_x.is_finite() || !min_y.is_finite() || !max_x.is_finite() || !max_y.is_finite() {
        return None;
    }
    Some(Bounds::new(min_x, min_y, max_x, max_y))
}
