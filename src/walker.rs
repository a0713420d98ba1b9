//! Depth-first scene walk that turns the node tree into surface calls.
//!
//! The walk is strictly paired: every node entry saves the drawing state and
//! the matching exit restores it, so siblings never see each other's state.
//! A node draws its own geometry first, then its graphic, then its children.

use crate::error::ConvertError;
use crate::geom::Affine;
use crate::listener::ConvertListener;
use crate::scene::{Node, NodeKind};
use crate::shape::{Shape, shape_of};
use crate::state::{ClipShape, RenderStateStack};
use crate::style::{self, StrokeStyle};
use crate::surface::Surface;
use crate::types::{Color, Paint};

pub(crate) fn convert(
    root: &Node,
    surface: &mut dyn Surface,
    listener: &mut dyn ConvertListener,
    background: Option<Color>,
) -> Result<(), ConvertError> {
    let mut walker = Walker {
        surface,
        listener,
        state: RenderStateStack::new(),
    };
    if let Some(color) = background {
        walker.paint_background(root, color)?;
    }
    walker.walk(root, true)
}

struct Walker<'a> {
    surface: &'a mut dyn Surface,
    listener: &'a mut dyn ConvertListener,
    state: RenderStateStack,
}

impl Walker<'_> {
    /// Fill the root's layout bounds before anything else is drawn.
    fn paint_background(&mut self, root: &Node, color: Color) -> Result<(), ConvertError> {
        let bounds = root.layout_bounds();
        self.state
            .set_paint(&mut *self.surface, Some(Paint::Solid(color)))?;
        self.surface.fill_shape(&Shape::Rect {
            x: bounds.min_x,
            y: bounds.min_y,
            width: bounds.width(),
            height: bounds.height(),
        })
    }

    fn walk(&mut self, node: &Node, is_root: bool) -> Result<(), ConvertError> {
        // The root is converted unconditionally; everywhere else an
        // invisible node prunes its whole subtree.
        if !is_root && !style::is_visible(node) {
            return Ok(());
        }

        self.listener.node_start(node);
        let token = self.state.enter();

        self.apply_transform(node)?;
        self.apply_clip(node)?;

        if let Some(effect) = &node.effect {
            self.listener.effect_start(node, effect);
        }

        self.draw_node(node)?;

        if let Some(graphic) = &node.graphic {
            self.walk(graphic, false)?;
        }
        for child in &node.children {
            self.walk(child, false)?;
        }

        if node.effect.is_some() {
            self.listener.effect_end(node);
        }

        self.state.exit(token, &mut *self.surface)?;
        self.listener.node_end(node);
        Ok(())
    }

    /// Compose the node's local transform onto the current one. A fully
    /// identity local transform emits nothing.
    fn apply_transform(&mut self, node: &Node) -> Result<(), ConvertError> {
        let local = local_transform(node);
        if local.is_identity() {
            return Ok(());
        }
        let combined = self.state.transform().mul(local);
        self.state.set_transform(&mut *self.surface, combined)
    }

    /// The clip shape is carried with the clip node's own full local
    /// transform, so a rotated or scaled clip clips in its rotated frame.
    fn apply_clip(&mut self, node: &Node) -> Result<(), ConvertError> {
        let Some(clip_node) = &node.clip else {
            return Ok(());
        };
        let Some(shape) = shape_of(clip_node) else {
            return Ok(());
        };
        let transform = self.state.transform().mul(local_transform(clip_node));
        self.state
            .intersect_clip(&mut *self.surface, ClipShape { shape, transform })
    }

    fn draw_node(&mut self, node: &Node) -> Result<(), ConvertError> {
        match &node.kind {
            NodeKind::Container { fills, strokes } => self.draw_container(node, fills, strokes),
            NodeKind::Text { x, y, text } => self.draw_text_node(node, *x, *y, text),
            NodeKind::Image {
                x,
                y,
                natural_width,
                natural_height,
                fit_width,
                fit_height,
                preserve_ratio,
                source,
            } => {
                let (width, height) = image_fit(
                    *natural_width,
                    *natural_height,
                    *fit_width,
                    *fit_height,
                    *preserve_ratio,
                );
                if width <= 0.0 || height <= 0.0 {
                    return Ok(());
                }
                self.surface.draw_image(*x, *y, width, height, source)
            }
            NodeKind::Volumetric { .. } => Ok(()),
            NodeKind::Embedded { root } => self.walk(root, false),
            _ => {
                let Some(shape) = shape_of(node) else {
                    return Ok(());
                };
                self.draw_shape(node, &shape)
            }
        }
    }

    /// Fill, then stroke. Lines and open curves never fill regardless of
    /// their fill attribute.
    fn draw_shape(&mut self, node: &Node, shape: &Shape) -> Result<(), ConvertError> {
        let style = style::resolve(node);
        let stroke_only = matches!(
            node.kind,
            NodeKind::Line { .. } | NodeKind::QuadCurve { .. } | NodeKind::CubicCurve { .. }
        );
        if !stroke_only && style.fill.is_some() {
            self.state.set_paint(&mut *self.surface, style.fill)?;
            self.surface.fill_shape(shape)?;
        }
        if let Some(stroke) = style.stroke {
            self.state
                .set_stroke(&mut *self.surface, style.stroke_style)?;
            self.state.set_paint(&mut *self.surface, Some(stroke))?;
            self.surface.stroke_shape(shape)?;
        }
        Ok(())
    }

    fn draw_text_node(
        &mut self,
        node: &Node,
        x: f64,
        y: f64,
        text: &str,
    ) -> Result<(), ConvertError> {
        if text.is_empty() {
            return Ok(());
        }
        let style = style::resolve(node);
        let Some(fill) = style.fill else {
            return Ok(());
        };
        self.state.set_paint(&mut *self.surface, Some(fill))?;
        self.state.set_font(&mut *self.surface, style.font)?;
        self.surface.draw_text(x, y, text)
    }

    /// Background fills back to front, then border strokes, all sized from
    /// the container's layout bounds minus each layer's insets.
    fn draw_container(
        &mut self,
        node: &Node,
        fills: &[crate::scene::BackgroundFill],
        strokes: &[crate::scene::BorderStroke],
    ) -> Result<(), ConvertError> {
        if fills.is_empty() && strokes.is_empty() {
            return Ok(());
        }
        let bounds = node.layout_bounds();
        for fill in fills {
            let opacity = style::channel_opacity(node, &fill.paint);
            if opacity <= 0.0 {
                continue;
            }
            let paint = style::resolve_paint(fill.paint.clone(), bounds, opacity);
            self.state.set_paint(&mut *self.surface, Some(paint))?;
            self.surface
                .fill_shape(&layer_rect(bounds, fill.insets, fill.radius))?;
        }
        for stroke in strokes {
            let opacity = style::channel_opacity(node, &stroke.paint);
            if opacity <= 0.0 {
                continue;
            }
            let paint = style::resolve_paint(stroke.paint.clone(), bounds, opacity);
            self.state.set_stroke(
                &mut *self.surface,
                StrokeStyle {
                    width: stroke.width,
                    ..StrokeStyle::default()
                },
            )?;
            self.state.set_paint(&mut *self.surface, Some(paint))?;
            self.surface
                .stroke_shape(&layer_rect(bounds, stroke.insets, stroke.radius))?;
        }
        Ok(())
    }
}

/// A node's local transform: the explicit transform list, then translation
/// (including layout position), then scale, then rotation about the pivot
/// (layout-bounds center by default).
fn local_transform(node: &Node) -> Affine {
    let mut local = Affine::IDENTITY;
    for transform in &node.transforms {
        if !transform.is_identity() {
            local = local.mul(transform.to_affine());
        }
    }
    let tx = node.translate_x + node.layout_x;
    let ty = node.translate_y + node.layout_y;
    if tx != 0.0 || ty != 0.0 {
        local = local.mul(Affine::translate(tx, ty));
    }
    if node.scale_x != 1.0 || node.scale_y != 1.0 {
        local = local.mul(Affine::scale(node.scale_x, node.scale_y));
    }
    if node.rotate_deg != 0.0 {
        let (px, py) = node
            .rotation_pivot
            .unwrap_or_else(|| node.layout_bounds().center());
        local = local.mul(Affine::rotate_about(node.rotate_deg.to_radians(), px, py));
    }
    local
}

fn layer_rect(bounds: crate::geom::Bounds, insets: f64, radius: f64) -> Shape {
    let x = bounds.min_x + insets;
    let y = bounds.min_y + insets;
    let width = (bounds.width() - 2.0 * insets).max(0.0);
    let height = (bounds.height() - 2.0 * insets).max(0.0);
    if radius > 0.0 {
        Shape::RoundRect {
            x,
            y,
            width,
            height,
            arc_width: 2.0 * radius,
            arc_height: 2.0 * radius,
        }
    } else {
        Shape::Rect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Displayed size of an image: a fit dimension of zero or less means
/// "natural size", and ratio preservation shrinks to the limiting fit
/// dimension.
fn image_fit(
    natural_width: f64,
    natural_height: f64,
    fit_width: f64,
    fit_height: f64,
    preserve_ratio: bool,
) -> (f64, f64) {
    if natural_width <= 0.0 || natural_height <= 0.0 {
        return (0.0, 0.0);
    }
    if !preserve_ratio {
        let width = if fit_width > 0.0 { fit_width } else { natural_width };
        let height = if fit_height > 0.0 {
            fit_height
        } else {
            natural_height
        };
        return (width, height);
    }
    let scale = match (fit_width > 0.0, fit_height > 0.0) {
        (true, true) => (fit_width / natural_width).min(fit_height / natural_height),
        (true, false) => fit_width / natural_width,
        (false, true) => fit_height / natural_height,
        (false, false) => 1.0,
    };
    (natural_width * scale, natural_height * scale)
}
