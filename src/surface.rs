//! The drawing surface abstraction and a recording implementation.
//!
//! A conversion issues its entire output through the [`Surface`] trait, in
//! order. [`RecordingSurface`] captures that stream as a command list with
//! coordinates snapped to the millipoint grid, which keeps recorded streams
//! deterministic and directly comparable in tests.

use crate::error::ConvertError;
use crate::geom::{Affine, Segment};
use crate::shape::Shape;
use crate::state::ClipRegion;
use crate::style::StrokeStyle;
use crate::types::{FontSpec, Paint, q};

/// Receiver of an ordered immediate-mode drawing stream.
///
/// State setters are sticky: a paint, stroke, font, transform, or clip stays
/// in effect until replaced. Drawing calls consume whatever is current.
pub trait Surface {
    fn set_transform(&mut self, transform: &Affine) -> Result<(), ConvertError>;
    fn set_paint(&mut self, paint: Option<&Paint>) -> Result<(), ConvertError>;
    fn set_stroke(&mut self, stroke: &StrokeStyle) -> Result<(), ConvertError>;
    fn set_font(&mut self, font: &FontSpec) -> Result<(), ConvertError>;
    fn set_clip(&mut self, clip: &ClipRegion) -> Result<(), ConvertError>;
    fn fill_shape(&mut self, shape: &Shape) -> Result<(), ConvertError>;
    fn stroke_shape(&mut self, shape: &Shape) -> Result<(), ConvertError>;
    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<(), ConvertError>;
    fn draw_image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        source: &str,
    ) -> Result<(), ConvertError>;
}

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetTransform(Affine),
    SetPaint(Option<Paint>),
    SetStroke(StrokeStyle),
    SetFont(FontSpec),
    SetClip(ClipRegion),
    Fill(Shape),
    Stroke(Shape),
    Text { x: f64, y: f64, text: String },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        source: String,
    },
}

/// A surface that records the command stream instead of rasterizing it.
///
/// Repeated state sets with an unchanged value are dropped, so the recorded
/// stream carries only effective state transitions.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<Command>,
    transform: Option<Affine>,
    paint: Option<Option<Paint>>,
    stroke: Option<StrokeStyle>,
    font: Option<FontSpec>,
    clip: Option<ClipRegion>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

impl Surface for RecordingSurface {
    fn set_transform(&mut self, transform: &Affine) -> Result<(), ConvertError> {
        let snapped = quantize_affine(*transform);
        if self.transform != Some(snapped) {
            self.transform = Some(snapped);
            self.commands.push(Command::SetTransform(snapped));
        }
        Ok(())
    }

    fn set_paint(&mut self, paint: Option<&Paint>) -> Result<(), ConvertError> {
        let paint = paint.cloned();
        if self.paint.as_ref() != Some(&paint) {
            self.paint = Some(paint.clone());
            self.commands.push(Command::SetPaint(paint));
        }
        Ok(())
    }

    fn set_stroke(&mut self, stroke: &StrokeStyle) -> Result<(), ConvertError> {
        if self.stroke.as_ref() != Some(stroke) {
            self.stroke = Some(stroke.clone());
            self.commands.push(Command::SetStroke(stroke.clone()));
        }
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) -> Result<(), ConvertError> {
        if self.font.as_ref() != Some(font) {
            self.font = Some(font.clone());
            self.commands.push(Command::SetFont(font.clone()));
        }
        Ok(())
    }

    fn set_clip(&mut self, clip: &ClipRegion) -> Result<(), ConvertError> {
        if self.clip.as_ref() != Some(clip) {
            self.clip = Some(clip.clone());
            self.commands.push(Command::SetClip(clip.clone()));
        }
        Ok(())
    }

    fn fill_shape(&mut self, shape: &Shape) -> Result<(), ConvertError> {
        self.commands.push(Command::Fill(quantize_shape(shape)));
        Ok(())
    }

    fn stroke_shape(&mut self, shape: &Shape) -> Result<(), ConvertError> {
        self.commands.push(Command::Stroke(quantize_shape(shape)));
        Ok(())
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) -> Result<(), ConvertError> {
        self.commands.push(Command::Text {
            x: q(x),
            y: q(y),
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        source: &str,
    ) -> Result<(), ConvertError> {
        self.commands.push(Command::Image {
            x: q(x),
            y: q(y),
            width: q(width),
            height: q(height),
            source: source.to_string(),
        });
        Ok(())
    }
}

/// Snap the translation components; the linear part is unitless and stays
/// exact.
fn quantize_affine(t: Affine) -> Affine {
    Affine {
        e: q(t.e),
        f: q(t.f),
        ..t
    }
}

fn quantize_shape(shape: &Shape) -> Shape {
    match shape {
        Shape::Path(segments) => {
            Shape::Path(segments.iter().map(quantize_segment).collect())
        }
        Shape::Line { x1, y1, x2, y2 } => Shape::Line {
            x1: q(*x1),
            y1: q(*y1),
            x2: q(*x2),
            y2: q(*y2),
        },
        Shape::Circle { cx, cy, r } => Shape::Circle {
            cx: q(*cx),
            cy: q(*cy),
            r: q(*r),
        },
        Shape::Ellipse { cx, cy, rx, ry } => Shape::Ellipse {
            cx: q(*cx),
            cy: q(*cy),
            rx: q(*rx),
            ry: q(*ry),
        },
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => Shape::Rect {
            x: q(*x),
            y: q(*y),
            width: q(*width),
            height: q(*height),
        },
        Shape::RoundRect {
            x,
            y,
            width,
            height,
            arc_width,
            arc_height,
        } => Shape::RoundRect {
            x: q(*x),
            y: q(*y),
            width: q(*width),
            height: q(*height),
            arc_width: q(*arc_width),
            arc_height: q(*arc_height),
        },
        Shape::Arc {
            cx,
            cy,
            rx,
            ry,
            start_deg,
            extent_deg,
            closure,
        } => Shape::Arc {
            cx: q(*cx),
            cy: q(*cy),
            rx: q(*rx),
            ry: q(*ry),
            start_deg: q(*start_deg),
            extent_deg: q(*extent_deg),
            closure: *closure,
        },
    }
}

fn quantize_segment(segment: &Segment) -> Segment {
    match *segment {
        Segment::MoveTo { x, y } => Segment::MoveTo { x: q(x), y: q(y) },
        Segment::LineTo { x, y } => Segment::LineTo { x: q(x), y: q(y) },
        Segment::QuadTo { cx, cy, x, y } => Segment::QuadTo {
            cx: q(cx),
            cy: q(cy),
            x: q(x),
            y: q(y),
        },
        Segment::CurveTo {
            cx1,
            cy1,
            cx2,
            cy2,
            x,
            y,
        } => Segment::CurveTo {
            cx1: q(cx1),
            cy1: q(cy1),
            cx2: q(cx2),
            cy2: q(cy2),
            x: q(x),
            y: q(y),
        },
        Segment::ArcTo {
            cx,
            cy,
            rx,
            ry,
            start_deg,
            extent_deg,
            rotation_rad,
        } => Segment::ArcTo {
            cx: q(cx),
            cy: q(cy),
            rx: q(rx),
            ry: q(ry),
            start_deg: q(start_deg),
            extent_deg: q(extent_deg),
            rotation_rad,
        },
        Segment::Close => Segment::Close,
    }
}
