use fixed::types::I32F32;

/// A quantized coordinate value (millipoint precision).
///
/// Conversion math runs in `f64`; `Pt` only exists at the recording-surface
/// boundary so that recorded command streams are deterministic and directly
/// comparable in tests.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(I32F32);

impl Pt {
    pub const ZERO: Pt = Pt(I32F32::from_bits(0));

    pub fn from_f64(value: f64) -> Pt {
        if !value.is_finite() {
            return Pt::ZERO;
        }
        let milli = (value * 1000.0).round();
        let milli = milli.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Pt::from_milli_i64(milli)
    }

    pub fn to_f64(self) -> f64 {
        self.0.to_num()
    }

    pub fn from_milli_i64(milli: i64) -> Pt {
        let denom = 1i128 << 32;
        let milli = milli as i128;
        let adj = if milli >= 0 { 500 } else { -500 };
        let bits = (milli * denom + adj) / 1000;
        let bits = bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Pt(I32F32::from_bits(bits))
    }

    pub fn to_milli_i64(self) -> i64 {
        let bits = self.0.to_bits() as i128;
        let denom = 1i128 << 32;
        let scaled = bits * 1000;
        let adj = if scaled >= 0 { denom / 2 } else { -denom / 2 };
        let milli = (scaled + adj) / denom;
        milli.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

/// Snap a coordinate to the recording grid.
pub(crate) fn q(value: f64) -> f64 {
    Pt::from_f64(value).to_f64()
}

/// An RGBA color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with its alpha capped at `opacity`.
    pub fn with_max_alpha(self, opacity: f64) -> Self {
        if opacity >= 0.0 && opacity < self.a {
            Color { a: opacity, ..self }
        } else {
            self
        }
    }
}

/// One gradient stop, with offset in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStop {
    pub offset: f64,
    pub color: Color,
}

/// What happens outside the 0..=1 gradient range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMethod {
    NoCycle,
    Reflect,
    Repeat,
}

/// A paint.
///
/// Gradient coordinates are either absolute (local node space) or, when
/// `proportional` is set, fractions of the node's layout bounds. The style
/// layer resolves proportional coordinates to absolute ones before a `Paint`
/// reaches a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Axial {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        proportional: bool,
        stops: Vec<PaintStop>,
        cycle: CycleMethod,
    },
    Radial {
        cx: f64,
        cy: f64,
        radius: f64,
        proportional: bool,
        stops: Vec<PaintStop>,
        cycle: CycleMethod,
    },
}

impl Paint {
    /// The alpha-derived opacity of the paint. Gradients report 1; their
    /// per-stop alphas are folded when the paint is resolved.
    pub fn intrinsic_opacity(&self) -> f64 {
        match self {
            Paint::Solid(color) => color.a,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Light,
    Normal,
    Bold,
    ExtraBold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontPosture {
    Regular,
    Italic,
}

/// A font descriptor. No shaping or metrics happen in this crate; the
/// descriptor passes through to the drawing surface untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub weight: FontWeight,
    pub posture: FontPosture,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Normal,
            posture: FontPosture::Regular,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec::new("System", 12.0)
    }
}
