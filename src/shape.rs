//! Adapter from scene-node geometry to drawable shape primitives.
//!
//! Primitives that a surface can express directly (lines, circles, ellipses,
//! rectangles, arcs) are preserved exactly rather than flattened to path
//! segments; only genuinely path-shaped content becomes a segment list.

use crate::geom::Segment;
use crate::path;
use crate::scene::{ArcClosure, Node, NodeKind, props};

/// A drawable shape primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Path(Vec<Segment>),
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
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
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    RoundRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    },
    Arc {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        start_deg: f64,
        extent_deg: f64,
        closure: ArcClosure,
    },
}

/// Effective corner arc width of a rectangle node: an explicit property
/// override wins over the native value.
pub fn rect_arc_width(node: &Node) -> f64 {
    let native = match node.kind {
        NodeKind::Rectangle { arc_width, .. } => arc_width,
        _ => 0.0,
    };
    node.style
        .explicit_number(props::ARC_WIDTH)
        .unwrap_or(native)
}

/// Effective corner arc height of a rectangle node. When no explicit
/// override is present this falls back to the native arc *width*, matching
/// long-standing renderer behavior that downstreams rely on.
pub fn rect_arc_height(node: &Node) -> f64 {
    let native = match node.kind {
        NodeKind::Rectangle { arc_width, .. } => arc_width,
        _ => 0.0,
    };
    node.style
        .explicit_number(props::ARC_HEIGHT)
        .unwrap_or(native)
}

/// The drawable shape of a node, or None for nodes that have no fillable or
/// strokeable outline (containers, text, images, flattened 3D content).
pub fn shape_of(node: &Node) -> Option<Shape> {
    match &node.kind {
        NodeKind::Line {
            start_x,
            start_y,
            end_x,
            end_y,
        } => Some(Shape::Line {
            x1: *start_x,
            y1: *start_y,
            x2: *end_x,
            y2: *end_y,
        }),
        NodeKind::Circle { cx, cy, r } => Some(Shape::Circle {
            cx: *cx,
            cy: *cy,
            r: *r,
        }),
        NodeKind::Ellipse { cx, cy, rx, ry } => Some(Shape::Ellipse {
            cx: *cx,
            cy: *cy,
            rx: *rx,
            ry: *ry,
        }),
        NodeKind::Rectangle {
            x,
            y,
            width,
            height,
            ..
        } => {
            let arc_width = rect_arc_width(node);
            let arc_height = rect_arc_height(node);
            if arc_width > 0.0 || arc_height > 0.0 {
                Some(Shape::RoundRect {
                    x: *x,
                    y: *y,
                    width: *width,
                    height: *height,
                    arc_width,
                    arc_height,
                })
            } else {
                Some(Shape::Rect {
                    x: *x,
                    y: *y,
                    width: *width,
                    height: *height,
                })
            }
        }
        NodeKind::Arc {
            cx,
            cy,
            rx,
            ry,
            start_deg,
            length_deg,
            closure,
        } => {
            // A full sweep is just the ellipse.
            if length_deg.abs() >= 360.0 {
                return Some(Shape::Ellipse {
                    cx: *cx,
                    cy: *cy,
                    rx: *rx,
                    ry: *ry,
                });
            }
            let mut start = *start_deg;
            let mut extent = *length_deg;
            if extent < 0.0 {
                start += extent;
                extent = -extent;
            }
            Some(Shape::Arc {
                cx: *cx,
                cy: *cy,
                rx: *rx,
                ry: *ry,
                start_deg: start,
                extent_deg: extent,
                closure: *closure,
            })
        }
        NodeKind::Polygon { points } => poly_segments(points, true).map(Shape::Path),
        NodeKind::Polyline { points } => poly_segments(points, false).map(Shape::Path),
        NodeKind::PathShape { data } => path::parse(data).ok().map(Shape::Path),
        NodeKind::QuadCurve {
            start_x,
            start_y,
            ctrl_x,
            ctrl_y,
            end_x,
            end_y,
        } => Some(Shape::Path(vec![
            Segment::MoveTo {
                x: *start_x,
                y: *start_y,
            },
            Segment::QuadTo {
                cx: *ctrl_x,
                cy: *ctrl_y,
                x: *end_x,
                y: *end_y,
            },
        ])),
        NodeKind::CubicCurve {
            start_x,
            start_y,
            ctrl_x1,
            ctrl_y1,
            ctrl_x2,
            ctrl_y2,
            end_x,
            end_y,
        } => Some(Shape::Path(vec![
            Segment::MoveTo {
                x: *start_x,
                y: *start_y,
            },
            Segment::CurveTo {
                cx1: *ctrl_x1,
                cy1: *ctrl_y1,
                cx2: *ctrl_x2,
                cy2: *ctrl_y2,
                x: *end_x,
                y: *end_y,
            },
        ])),
        NodeKind::Container { .. }
        | NodeKind::Text { .. }
        | NodeKind::Image { .. }
        | NodeKind::Volumetric { .. }
        | NodeKind::Embedded { .. } => None,
    }
}

/// Pair up a flat coordinate list; an odd trailing value is dropped. Needs
/// at least two points to produce anything.
fn poly_segments(points: &[f64], close: bool) -> Option<Vec<Segment>> {
    let mut pairs = points.chunks_exact(2);
    let first = pairs.next()?;
    let mut segs = vec![Segment::MoveTo {
        x: first[0],
        y: first[1],
    }];
    for pair in pairs {
        segs.push(Segment::LineTo {
            x: pair[0],
            y: pair[1],
        });
    }
    if segs.len() < 2 {
        return None;
    }
    if close {
        segs.push(Segment::Close);
    }
    Some(segs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PropertyValue;

    fn rect_node(arc_width: f64, arc_height: f64) -> Node {
        Node::new(NodeKind::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 10.0,
            arc_width,
            arc_height,
        })
    }

    #[test]
    fn plain_rectangle_stays_rectangular() {
        assert_eq!(
            shape_of(&rect_node(0.0, 0.0)),
            Some(Shape::Rect {
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 10.0
            })
        );
    }

    #[test]
    fn rect_arc_height_falls_back_to_arc_width() {
        // Without an explicit override both corner dimensions come from the
        // native arc width.
        let node = rect_node(6.0, 2.0);
        assert_eq!(rect_arc_width(&node), 6.0);
        assert_eq!(rect_arc_height(&node), 6.0);

        let mut node = rect_node(6.0, 2.0);
        node.style
            .set(props::ARC_HEIGHT, PropertyValue::Number(3.0));
        assert_eq!(rect_arc_height(&node), 3.0);
    }

    #[test]
    fn full_sweep_arc_collapses_to_ellipse() {
        let node = Node::new(NodeKind::Arc {
            cx: 5.0,
            cy: 5.0,
            rx: 4.0,
            ry: 3.0,
            start_deg: 30.0,
            length_deg: 360.0,
            closure: ArcClosure::Round,
        });
        assert_eq!(
            shape_of(&node),
            Some(Shape::Ellipse {
                cx: 5.0,
                cy: 5.0,
                rx: 4.0,
                ry: 3.0
            })
        );
    }

    #[test]
    fn negative_arc_extent_is_normalized() {
        let node = Node::new(NodeKind::Arc {
            cx: 0.0,
            cy: 0.0,
            rx: 5.0,
            ry: 5.0,
            start_deg: 90.0,
            length_deg: -60.0,
            closure: ArcClosure::Open,
        });
        let Some(Shape::Arc {
            start_deg,
            extent_deg,
            ..
        }) = shape_of(&node)
        else {
            panic!("expected an arc");
        };
        assert_eq!(start_deg, 30.0);
        assert_eq!(extent_deg, 60.0);
    }

    #[test]
    fn polygon_closes_and_drops_odd_trailing_value() {
        let node = Node::new(NodeKind::Polygon {
            points: vec![0.0, 0.0, 10.0, 0.0, 5.0, 8.0, 99.0],
        });
        assert_eq!(
            shape_of(&node),
            Some(Shape::Path(vec![
                Segment::MoveTo { x: 0.0, y: 0.0 },
                Segment::LineTo { x: 10.0, y: 0.0 },
                Segment::LineTo { x: 5.0, y: 8.0 },
                Segment::Close,
            ]))
        );
    }

    #[test]
    fn polyline_stays_open() {
        let node = Node::new(NodeKind::Polyline {
            points: vec![0.0, 0.0, 10.0, 0.0],
        });
        let Some(Shape::Path(segs)) = shape_of(&node) else {
            panic!("expected a path");
        };
        assert!(!segs.contains(&Segment::Close));
    }

    #[test]
    fn single_point_polygon_draws_nothing() {
        let node = Node::new(NodeKind::Polygon {
            points: vec![1.0, 2.0],
        });
        assert_eq!(shape_of(&node), None);
    }

    #[test]
    fn bad_path_data_draws_nothing() {
        let node = Node::new(NodeKind::PathShape {
            data: "garbage".to_string(),
        });
        assert_eq!(shape_of(&node), None);
    }

    #[test]
    fn container_has_no_shape() {
        assert_eq!(shape_of(&Node::group()), None);
    }
}
