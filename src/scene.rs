//! The retained scene model: a tree of nodes with geometry, transforms,
//! styling attributes, and an optional property map of author overrides.
//!
//! The model is deliberately inert. Nothing here draws; the walker consumes
//! the tree and the style layer decides what the attributes mean.

use std::collections::HashMap;

use crate::geom::{Bounds, segments_bounds};
use crate::path;
use crate::types::{FontSpec, LineCap, LineJoin, Paint};

/// How an arc primitive is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcClosure {
    /// Endpoints left unconnected.
    Open,
    /// Endpoints joined by a straight chord.
    Chord,
    /// Endpoints joined through the center, pie style.
    Round,
}

/// One fill layer of a container background, painted back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundFill {
    pub paint: Paint,
    pub radius: f64,
    pub insets: f64,
}

/// One stroke layer of a container border.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderStroke {
    pub paint: Paint,
    pub width: f64,
    pub radius: f64,
    pub insets: f64,
}

/// An opaque reference to a visual effect applied to a subtree. The engine
/// never interprets effects; it only brackets the affected drawing calls for
/// the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectHandle(pub String);

/// The geometry a node carries.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A pure grouping node, optionally with background fills and border
    /// strokes painted before its children.
    Container {
        fills: Vec<BackgroundFill>,
        strokes: Vec<BorderStroke>,
    },
    Line {
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
    },
    /// Flat coordinate list; an odd trailing value is dropped.
    Polygon {
        points: Vec<f64>,
    },
    Polyline {
        points: Vec<f64>,
    },
    /// Path mini-language content, interpreted lazily at draw time.
    PathShape {
        data: String,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Arc {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        start_deg: f64,
        length_deg: f64,
        closure: ArcClosure,
    },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    },
    QuadCurve {
        start_x: f64,
        start_y: f64,
        ctrl_x: f64,
        ctrl_y: f64,
        end_x: f64,
        end_y: f64,
    },
    CubicCurve {
        start_x: f64,
        start_y: f64,
        ctrl_x1: f64,
        ctrl_y1: f64,
        ctrl_x2: f64,
        ctrl_y2: f64,
        end_x: f64,
        end_y: f64,
    },
    Image {
        x: f64,
        y: f64,
        natural_width: f64,
        natural_height: f64,
        fit_width: f64,
        fit_height: f64,
        preserve_ratio: bool,
        source: String,
    },
    /// A 3D node flattened away: it occupies layout space but draws nothing.
    Volumetric {
        width: f64,
        height: f64,
    },
    /// A nested scene hosted inside this tree; conversion recurses into its
    /// root.
    Embedded {
        root: Box<Node>,
    },
}

/// One entry in a node's transform list, applied in list order before the
/// node's own translate/scale/rotate fields.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneTransform {
    Affine(crate::geom::Affine),
    Translate { x: f64, y: f64 },
    Scale { x: f64, y: f64 },
    Rotate { deg: f64, px: f64, py: f64 },
}

impl SceneTransform {
    pub fn is_identity(&self) -> bool {
        match self {
            SceneTransform::Affine(m) => m.is_identity(),
            SceneTransform::Translate { x, y } => *x == 0.0 && *y == 0.0,
            SceneTransform::Scale { x, y } => *x == 1.0 && *y == 1.0,
            SceneTransform::Rotate { deg, .. } => *deg == 0.0,
        }
    }

    pub fn to_affine(&self) -> crate::geom::Affine {
        match *self {
            SceneTransform::Affine(m) => m,
            SceneTransform::Translate { x, y } => crate::geom::Affine::translate(x, y),
            SceneTransform::Scale { x, y } => crate::geom::Affine::scale(x, y),
            SceneTransform::Rotate { deg, px, py } => {
                crate::geom::Affine::rotate_about(deg.to_radians(), px, py)
            }
        }
    }
}

/// Native styling attributes of a node, as set through the scene API (as
/// opposed to `PropertyMap` overrides, which win).
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeAttrs {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub stroke_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub dash_array: Vec<f64>,
    pub dash_offset: f64,
    pub font: FontSpec,
}

impl Default for ShapeAttrs {
    fn default() -> Self {
        Self {
            fill: Some(Paint::Solid(crate::types::Color::BLACK)),
            stroke: None,
            stroke_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
            font: FontSpec::default(),
        }
    }
}

/// A typed property override value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Bool(bool),
    Paint(Paint),
    Text(String),
    Font(FontSpec),
    NumberList(Vec<f64>),
    Cap(LineCap),
    Join(LineJoin),
}

/// Well-known property names understood by the style resolver.
pub mod props {
    pub const VISIBILITY: &str = "visibility";
    pub const OPACITY: &str = "opacity";
    pub const FILL: &str = "fill";
    pub const STROKE: &str = "stroke";
    pub const STROKE_WIDTH: &str = "stroke-width";
    pub const STROKE_LINECAP: &str = "stroke-linecap";
    pub const STROKE_LINEJOIN: &str = "stroke-linejoin";
    pub const STROKE_MITERLIMIT: &str = "stroke-miterlimit";
    pub const STROKE_DASHARRAY: &str = "stroke-dasharray";
    pub const STROKE_DASHOFFSET: &str = "stroke-dashoffset";
    pub const TEXT_FILL: &str = "text-fill";
    pub const FONT_FAMILY: &str = "font-family";
    pub const FONT_SIZE: &str = "font-size";
    pub const FONT_WEIGHT: &str = "font-weight";
    pub const FONT_STYLE: &str = "font-style";
    pub const ARC_WIDTH: &str = "arc-width";
    pub const ARC_HEIGHT: &str = "arc-height";
}

/// Named property overrides attached to a node. An entry flagged explicit
/// was set directly by the author and takes precedence over the node's
/// native attribute for that channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: HashMap<String, (PropertyValue, bool)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an author-set (explicit) override.
    pub fn set(&mut self, name: &str, value: PropertyValue) {
        self.entries.insert(name.to_string(), (value, true));
    }

    /// Record a derived (non-explicit) value, e.g. one inherited from a
    /// stylesheet default.
    pub fn set_derived(&mut self, name: &str, value: PropertyValue) {
        self.entries.insert(name.to_string(), (value, false));
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name).map(|(v, _)| v)
    }

    /// The value only when it was set explicitly.
    pub fn get_explicit(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .get(name)
            .and_then(|(v, explicit)| explicit.then_some(v))
    }

    pub fn explicit_number(&self, name: &str) -> Option<f64> {
        match self.get_explicit(name) {
            Some(PropertyValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn explicit_bool(&self, name: &str) -> Option<bool> {
        match self.get_explicit(name) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn explicit_paint(&self, name: &str) -> Option<&Paint> {
        match self.get_explicit(name) {
            Some(PropertyValue::Paint(p)) => Some(p),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One node of the scene tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Option<String>,
    pub kind: NodeKind,
    /// Explicit transform list, applied before the positional fields below.
    pub transforms: Vec<SceneTransform>,
    pub translate_x: f64,
    pub translate_y: f64,
    pub layout_x: f64,
    pub layout_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotate_deg: f64,
    /// Rotation pivot override; defaults to the layout-bounds center.
    pub rotation_pivot: Option<(f64, f64)>,
    pub opacity: f64,
    pub visible: bool,
    pub effect: Option<EffectHandle>,
    pub clip: Option<Box<Node>>,
    pub attrs: ShapeAttrs,
    pub style: PropertyMap,
    /// An auxiliary node drawn before the children, e.g. a label's icon.
    pub graphic: Option<Box<Node>>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: None,
            kind,
            transforms: Vec::new(),
            translate_x: 0.0,
            translate_y: 0.0,
            layout_x: 0.0,
            layout_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotate_deg: 0.0,
            rotation_pivot: None,
            opacity: 1.0,
            visible: true,
            effect: None,
            clip: None,
            attrs: ShapeAttrs::default(),
            style: PropertyMap::new(),
            graphic: None,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Node::new(NodeKind::Container {
            fills: Vec::new(),
            strokes: Vec::new(),
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_fill(mut self, fill: Option<Paint>) -> Self {
        self.attrs.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: Option<Paint>) -> Self {
        self.attrs.stroke = stroke;
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.attrs.stroke_width = width;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_transform(mut self, transform: SceneTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.translate_x = x;
        self.translate_y = y;
        self
    }

    /// The local-space bounding box of this node's own geometry plus its
    /// children, each child offset by its translation and layout position.
    /// Stroke widening and effects are not accounted for.
    pub fn layout_bounds(&self) -> Bounds {
        let mut bounds: Option<Bounds> = self.own_bounds();
        for child in &self.children {
            let child_bounds = child
                .layout_bounds()
                .translated(child.translate_x + child.layout_x, child.translate_y + child.layout_y);
            bounds = Some(match bounds {
                Some(b) => b.union(child_bounds),
                None => child_bounds,
            });
        }
        bounds.unwrap_or(Bounds::EMPTY)
    }

    fn own_bounds(&self) -> Option<Bounds> {
        match &self.kind {
            NodeKind::Container { .. } => None,
            NodeKind::Line {
                start_x,
                start_y,
                end_x,
                end_y,
            } => Some(Bounds::new(
                start_x.min(*end_x),
                start_y.min(*end_y),
                start_x.max(*end_x),
                start_y.max(*end_y),
            )),
            // No text metrics in this crate; the anchor point stands in.
            NodeKind::Text { x, y, .. } => Some(Bounds::new(*x, *y, *x, *y)),
            NodeKind::Polygon { points } | NodeKind::Polyline { points } => {
                points_bounds(points)
            }
            NodeKind::PathShape { data } => {
                let segments = path::parse(data).ok()?;
                segments_bounds(&segments)
            }
            NodeKind::Circle { cx, cy, r } => {
                Some(Bounds::new(cx - r, cy - r, cx + r, cy + r))
            }
            NodeKind::Ellipse { cx, cy, rx, ry } => {
                Some(Bounds::new(cx - rx, cy - ry, cx + rx, cy + ry))
            }
            NodeKind::Arc { cx, cy, rx, ry, .. } => {
                Some(Bounds::new(cx - rx, cy - ry, cx + rx, cy + ry))
            }
            NodeKind::Rectangle {
                x,
                y,
                width,
                height,
                ..
            } => Some(Bounds::new(*x, *y, x + width, y + height)),
            NodeKind::QuadCurve {
                start_x,
                start_y,
                ctrl_x,
                ctrl_y,
                end_x,
                end_y,
            } => points_bounds(&[*start_x, *start_y, *ctrl_x, *ctrl_y, *end_x, *end_y]),
            NodeKind::CubicCurve {
                start_x,
                start_y,
                ctrl_x1,
                ctrl_y1,
                ctrl_x2,
                ctrl_y2,
                end_x,
                end_y,
            } => points_bounds(&[
                *start_x, *start_y, *ctrl_x1, *ctrl_y1, *ctrl_x2, *ctrl_y2, *end_x, *end_y,
            ]),
            NodeKind::Image {
                x,
                y,
                natural_width,
                natural_height,
                fit_width,
                fit_height,
                ..
            } => {
                let w = if *fit_width > 0.0 {
                    *fit_width
                } else {
                    *natural_width
                };
                let h = if *fit_height > 0.0 {
                    *fit_height
                } else {
                    *natural_height
                };
                Some(Bounds::new(*x, *y, x + w, y + h))
            }
            NodeKind::Volumetric { width, height } => {
                Some(Bounds::new(0.0, 0.0, *width, *height))
            }
            NodeKind::Embedded { root } => Some(root.layout_bounds()),
        }
    }
}

fn points_bounds(points: &[f64]) -> Option<Bounds> {
    let mut pairs = points.chunks_exact(2);
    let first = pairs.next()?;
    let mut b = Bounds::new(first[0], first[1], first[0], first[1]);
    for pair in pairs {
        b = b.union(Bounds::new(pair[0], pair[1], pair[0], pair[1]));
    }
    Some(b)
}
