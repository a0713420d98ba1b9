//! Resolves what a node actually paints with: fill and stroke paints with
//! opacity folded in, stroke geometry parameters, and the font.
//!
//! Resolution is per attribute. An explicit property override always wins
//! over the node's native attribute for that one channel; other channels of
//! the same node are unaffected.

use crate::geom::Bounds;
use crate::scene::{Node, NodeKind, PropertyValue, props};
use crate::types::{FontPosture, FontSpec, FontWeight, LineCap, LineJoin, Paint};

/// Stroke geometry parameters, independent of the stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: Vec<f64>,
    pub dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

/// The resolved drawing style of one node. Paints are absolute (gradient
/// coordinates resolved) with opacity already folded into their alphas; a
/// `None` channel means nothing is drawn on that channel.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveStyle {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub stroke_style: StrokeStyle,
    pub font: FontSpec,
}

/// Resolve the effective style of a node.
pub fn resolve(node: &Node) -> EffectiveStyle {
    let bounds = node.layout_bounds();

    let fill_base = if matches!(node.kind, NodeKind::Text { .. }) {
        // Text prefers its dedicated fill channel.
        node.style
            .explicit_paint(props::TEXT_FILL)
            .or_else(|| node.style.explicit_paint(props::FILL))
            .cloned()
            .or_else(|| node.attrs.fill.clone())
    } else {
        node.style
            .explicit_paint(props::FILL)
            .cloned()
            .or_else(|| node.attrs.fill.clone())
    };
    let stroke_base = node
        .style
        .explicit_paint(props::STROKE)
        .cloned()
        .or_else(|| node.attrs.stroke.clone());

    EffectiveStyle {
        fill: fill_base.and_then(|p| apply_opacity(node, p, bounds)),
        stroke: stroke_base.and_then(|p| apply_opacity(node, p, bounds)),
        stroke_style: resolve_stroke_style(node),
        font: resolve_font(node),
    }
}

/// The opacity a paint channel draws with: the smallest of the node
/// opacity, the paint's own alpha, and an explicit opacity override when one
/// exists.
pub(crate) fn channel_opacity(node: &Node, paint: &Paint) -> f64 {
    let mut opacity = node.opacity.min(paint.intrinsic_opacity());
    if let Some(o) = node.style.explicit_number(props::OPACITY) {
        opacity = opacity.min(o);
    }
    opacity
}

fn apply_opacity(node: &Node, paint: Paint, bounds: Bounds) -> Option<Paint> {
    let opacity = channel_opacity(node, &paint);
    if opacity <= 0.0 {
        return None;
    }
    Some(resolve_paint(paint, bounds, opacity))
}

/// Resolve a paint to its absolute, alpha-folded form: proportional gradient
/// coordinates become layout-bounds coordinates, and `opacity` caps the
/// alpha of the color (or of every stop).
pub fn resolve_paint(paint: Paint, bounds: Bounds, opacity: f64) -> Paint {
    match paint {
        Paint::Solid(color) => Paint::Solid(color.with_max_alpha(opacity)),
        Paint::Axial {
            x0,
            y0,
            x1,
            y1,
            proportional,
            mut stops,
            cycle,
        } => {
            let (x0, y0, x1, y1) = if proportional {
                (
                    bounds.min_x + x0 * bounds.width(),
                    bounds.min_y + y0 * bounds.height(),
                    bounds.min_x + x1 * bounds.width(),
                    bounds.min_y + y1 * bounds.height(),
                )
            } else {
                (x0, y0, x1, y1)
            };
            for stop in &mut stops {
                stop.color = stop.color.with_max_alpha(opacity);
            }
            Paint::Axial {
                x0,
                y0,
                x1,
                y1,
                proportional: false,
                stops,
                cycle,
            }
        }
        Paint::Radial {
            cx,
            cy,
            radius,
            proportional,
            mut stops,
            cycle,
        } => {
            let (cx, cy, radius) = if proportional {
                (
                    bounds.min_x + cx * bounds.width(),
                    bounds.min_y + cy * bounds.height(),
                    radius * bounds.width().min(bounds.height()),
                )
            } else {
                (cx, cy, radius)
            };
            for stop in &mut stops {
                stop.color = stop.color.with_max_alpha(opacity);
            }
            Paint::Radial {
                cx,
                cy,
                radius,
                proportional: false,
                stops,
                cycle,
            }
        }
    }
}

fn resolve_stroke_style(node: &Node) -> StrokeStyle {
    let attrs = &node.attrs;
    let style = &node.style;
    let dash = match style.get_explicit(props::STROKE_DASHARRAY) {
        Some(PropertyValue::NumberList(values)) => values.clone(),
        _ => attrs.dash_array.clone(),
    };
    let cap = match style.get_explicit(props::STROKE_LINECAP) {
        Some(PropertyValue::Cap(cap)) => *cap,
        _ => attrs.line_cap,
    };
    let join = match style.get_explicit(props::STROKE_LINEJOIN) {
        Some(PropertyValue::Join(join)) => *join,
        _ => attrs.line_join,
    };
    StrokeStyle {
        width: style
            .explicit_number(props::STROKE_WIDTH)
            .unwrap_or(attrs.stroke_width),
        cap,
        join,
        miter_limit: style
            .explicit_number(props::STROKE_MITERLIMIT)
            .unwrap_or(attrs.miter_limit),
        dash,
        dash_offset: style
            .explicit_number(props::STROKE_DASHOFFSET)
            .unwrap_or(attrs.dash_offset),
    }
}

fn resolve_font(node: &Node) -> FontSpec {
    let mut font = node.attrs.font.clone();
    let style = &node.style;
    if let Some(PropertyValue::Font(f)) = style.get_explicit("font") {
        font = f.clone();
    }
    if let Some(PropertyValue::Text(family)) = style.get_explicit(props::FONT_FAMILY) {
        font.family = family.clone();
    }
    if let Some(size) = style.explicit_number(props::FONT_SIZE) {
        font.size = size;
    }
    if let Some(PropertyValue::Text(keyword)) = style.get_explicit(props::FONT_WEIGHT) {
        font.weight = weight_from_keyword(keyword);
    }
    if let Some(PropertyValue::Text(keyword)) = style.get_explicit(props::FONT_STYLE) {
        font.posture = posture_from_keyword(keyword);
    }
    font
}

/// Map a weight keyword onto the supported weights; unknown keywords keep
/// the normal weight.
pub fn weight_from_keyword(keyword: &str) -> FontWeight {
    match keyword.to_ascii_lowercase().as_str() {
        "light" | "lighter" => FontWeight::Light,
        "bold" => FontWeight::Bold,
        "bolder" | "extra-bold" | "black" => FontWeight::ExtraBold,
        _ => FontWeight::Normal,
    }
}

pub fn posture_from_keyword(keyword: &str) -> FontPosture {
    match keyword.to_ascii_lowercase().as_str() {
        "italic" | "oblique" => FontPosture::Italic,
        _ => FontPosture::Regular,
    }
}

/// Whether the node is visible for conversion purposes: an explicit
/// visibility override wins outright over the native flag.
pub fn is_visible(node: &Node) -> bool {
    node.style
        .explicit_bool(props::VISIBILITY)
        .unwrap_or(node.visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::props;
    use crate::types::{Color, CycleMethod, PaintStop};

    fn circle() -> Node {
        Node::new(NodeKind::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 10.0,
        })
    }

    #[test]
    fn explicit_fill_override_wins() {
        let mut node = circle();
        node.style.set(
            props::FILL,
            PropertyValue::Paint(Paint::Solid(Color::rgb(1.0, 0.0, 0.0))),
        );
        let style = resolve(&node);
        assert_eq!(style.fill, Some(Paint::Solid(Color::rgb(1.0, 0.0, 0.0))));
        // The stroke channel is untouched by the fill override.
        assert!(style.stroke.is_none());
    }

    #[test]
    fn absent_fill_means_no_fill() {
        let node = circle().with_fill(None);
        assert!(resolve(&node).fill.is_none());
    }

    #[test]
    fn node_opacity_caps_paint_alpha() {
        let node = circle().with_opacity(0.25);
        let Some(Paint::Solid(color)) = resolve(&node).fill else {
            panic!("expected a solid fill");
        };
        assert_eq!(color.a, 0.25);
    }

    #[test]
    fn paint_alpha_below_node_opacity_is_kept() {
        let node = circle()
            .with_fill(Some(Paint::Solid(Color::rgba(0.0, 0.0, 1.0, 0.1))))
            .with_opacity(0.5);
        let Some(Paint::Solid(color)) = resolve(&node).fill else {
            panic!("expected a solid fill");
        };
        assert_eq!(color.a, 0.1);
    }

    #[test]
    fn explicit_opacity_override_joins_the_min() {
        let mut node = circle();
        node.style.set(props::OPACITY, PropertyValue::Number(0.4));
        let Some(Paint::Solid(color)) = resolve(&node).fill else {
            panic!("expected a solid fill");
        };
        assert_eq!(color.a, 0.4);

        // The override can only lower the result, never raise it.
        let mut node = circle().with_opacity(0.2);
        node.style.set(props::OPACITY, PropertyValue::Number(0.9));
        let Some(Paint::Solid(color)) = resolve(&node).fill else {
            panic!("expected a solid fill");
        };
        assert_eq!(color.a, 0.2);
    }

    #[test]
    fn zero_opacity_drops_the_channel() {
        let node = circle().with_opacity(0.0);
        assert!(resolve(&node).fill.is_none());
    }

    #[test]
    fn text_prefers_its_own_fill_channel() {
        let mut node = Node::new(NodeKind::Text {
            x: 0.0,
            y: 0.0,
            text: "hi".to_string(),
        });
        node.style.set(
            props::FILL,
            PropertyValue::Paint(Paint::Solid(Color::rgb(0.0, 1.0, 0.0))),
        );
        node.style.set(
            props::TEXT_FILL,
            PropertyValue::Paint(Paint::Solid(Color::rgb(1.0, 0.0, 0.0))),
        );
        let style = resolve(&node);
        assert_eq!(style.fill, Some(Paint::Solid(Color::rgb(1.0, 0.0, 0.0))));
    }

    #[test]
    fn stroke_parameters_resolve_per_attribute() {
        let mut node = circle();
        node.attrs.stroke_width = 3.0;
        node.attrs.line_join = LineJoin::Round;
        node.style
            .set(props::STROKE_WIDTH, PropertyValue::Number(5.0));
        node.style
            .set(props::STROKE_DASHARRAY, PropertyValue::NumberList(vec![4.0, 2.0]));
        let style = resolve(&node).stroke_style;
        assert_eq!(style.width, 5.0);
        assert_eq!(style.join, LineJoin::Round);
        assert_eq!(style.dash, vec![4.0, 2.0]);
        assert_eq!(style.cap, LineCap::Butt);
    }

    #[test]
    fn proportional_gradient_resolves_against_layout_bounds() {
        let stops = vec![
            PaintStop {
                offset: 0.0,
                color: Color::BLACK,
            },
            PaintStop {
                offset: 1.0,
                color: Color::rgb(1.0, 1.0, 1.0),
            },
        ];
        let node = circle().with_fill(Some(Paint::Axial {
            x0: 0.0,
            y0: 0.0,
            x1: 1.0,
            y1: 0.0,
            proportional: true,
            stops,
            cycle: CycleMethod::NoCycle,
        }));
        // Circle bounds: (-10,-10)..(10,10).
        let Some(Paint::Axial {
            x0,
            y0,
            x1,
            proportional,
            ..
        }) = resolve(&node).fill
        else {
            panic!("expected an axial fill");
        };
        assert!(!proportional);
        assert_eq!(x0, -10.0);
        assert_eq!(y0, -10.0);
        assert_eq!(x1, 10.0);
    }

    #[test]
    fn gradient_stops_get_opacity_folded() {
        let node = circle()
            .with_fill(Some(Paint::Radial {
                cx: 0.5,
                cy: 0.5,
                radius: 0.5,
                proportional: true,
                stops: vec![PaintStop {
                    offset: 0.0,
                    color: Color::BLACK,
                }],
                cycle: CycleMethod::NoCycle,
            }))
            .with_opacity(0.5);
        let Some(Paint::Radial { stops, radius, .. }) = resolve(&node).fill else {
            panic!("expected a radial fill");
        };
        assert_eq!(stops[0].color.a, 0.5);
        assert_eq!(radius, 10.0);
    }

    #[test]
    fn font_keywords_map_to_weight_and_posture() {
        assert_eq!(weight_from_keyword("Bold"), FontWeight::Bold);
        assert_eq!(weight_from_keyword("black"), FontWeight::ExtraBold);
        assert_eq!(weight_from_keyword("unknown"), FontWeight::Normal);
        assert_eq!(posture_from_keyword("italic"), FontPosture::Italic);
        assert_eq!(posture_from_keyword("roman"), FontPosture::Regular);
    }

    #[test]
    fn explicit_visibility_override_wins_outright() {
        let mut node = circle().with_visible(false);
        node.style.set(props::VISIBILITY, PropertyValue::Bool(true));
        assert!(is_visible(&node));

        let mut node = circle();
        node.style
            .set(props::VISIBILITY, PropertyValue::Bool(false));
        assert!(!is_visible(&node));
    }
}
