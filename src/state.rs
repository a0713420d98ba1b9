//! Graphics-state bookkeeping for the scene walk.
//!
//! Every node entry saves the full drawing state; the matching exit restores
//! whatever the subtree changed. The stack mirrors what has actually been
//! sent to the surface, so restores only emit sets for channels that
//! differ.

use crate::error::ConvertError;
use crate::geom::Affine;
use crate::shape::Shape;
use crate::style::StrokeStyle;
use crate::surface::Surface;
use crate::types::{FontSpec, Paint};

/// One clip constraint: a shape in the coordinate space given by its
/// transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipShape {
    pub shape: Shape,
    pub transform: Affine,
}

/// The intersection of zero or more clip constraints. Clipping only ever
/// narrows: entering a clipped subtree adds a constraint, leaving it drops
/// the constraint again via the state stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipRegion {
    pub shapes: Vec<ClipShape>,
}

impl ClipRegion {
    pub fn is_unclipped(&self) -> bool {
        self.shapes.is_empty()
    }

    fn intersect(&self, clip: ClipShape) -> ClipRegion {
        let mut shapes = self.shapes.clone();
        shapes.push(clip);
        ClipRegion { shapes }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Frame {
    transform: Affine,
    paint: Option<Paint>,
    stroke: StrokeStyle,
    font: FontSpec,
    clip: ClipRegion,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            paint: None,
            stroke: StrokeStyle::default(),
            font: FontSpec::default(),
            clip: ClipRegion::default(),
        }
    }
}

/// Token returned by [`RenderStateStack::enter`]; handing it back to
/// [`RenderStateStack::exit`] restores to that depth even if intermediate
/// exits went missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveToken(usize);

/// The save/restore stack of drawing state.
#[derive(Debug, Default)]
pub struct RenderStateStack {
    current: Frame,
    saved: Vec<Frame>,
}

impl RenderStateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn transform(&self) -> Affine {
        self.current.transform
    }

    pub fn clip(&self) -> &ClipRegion {
        &self.current.clip
    }

    /// Save the current state.
    pub fn enter(&mut self) -> SaveToken {
        self.saved.push(self.current.clone());
        SaveToken(self.saved.len())
    }

    /// Restore to the depth recorded by `token`, emitting surface sets for
    /// every channel the subtree changed. A stale token (already restored
    /// past) is a no-op rather than an underflow.
    pub fn exit(&mut self, token: SaveToken, surface: &mut dyn Surface) -> Result<(), ConvertError> {
        if self.saved.len() < token.0 {
            return Ok(());
        }
        let mut frame = self.current.clone();
        while self.saved.len() >= token.0 {
            // Unwrap-free by construction: the loop condition guarantees a
            // saved frame with token.0 >= 1.
            if let Some(saved) = self.saved.pop() {
                frame = saved;
            }
        }
        if frame.clip != self.current.clip {
            surface.set_clip(&frame.clip)?;
        }
        if frame.stroke != self.current.stroke {
            surface.set_stroke(&frame.stroke)?;
        }
        if frame.font != self.current.font {
            surface.set_font(&frame.font)?;
        }
        if frame.paint != self.current.paint {
            surface.set_paint(frame.paint.as_ref())?;
        }
        if frame.transform != self.current.transform {
            surface.set_transform(&frame.transform)?;
        }
        self.current = frame;
        Ok(())
    }

    pub fn set_transform(
        &mut self,
        surface: &mut dyn Surface,
        transform: Affine,
    ) -> Result<(), ConvertError> {
        self.current.transform = transform;
        surface.set_transform(&transform)
    }

    pub fn set_paint(
        &mut self,
        surface: &mut dyn Surface,
        paint: Option<Paint>,
    ) -> Result<(), ConvertError> {
        surface.set_paint(paint.as_ref())?;
        self.current.paint = paint;
        Ok(())
    }

    pub fn set_stroke(
        &mut self,
        surface: &mut dyn Surface,
        stroke: StrokeStyle,
    ) -> Result<(), ConvertError> {
        surface.set_stroke(&stroke)?;
        self.current.stroke = stroke;
        Ok(())
    }

    pub fn set_font(
        &mut self,
        surface: &mut dyn Surface,
        font: FontSpec,
    ) -> Result<(), ConvertError> {
        surface.set_font(&font)?;
        self.current.font = font;
        Ok(())
    }

    /// Narrow the clip region by one more constraint.
    pub fn intersect_clip(
        &mut self,
        surface: &mut dyn Surface,
        clip: ClipShape,
    ) -> Result<(), ConvertError> {
        let narrowed = self.current.clip.intersect(clip);
        surface.set_clip(&narrowed)?;
        self.current.clip = narrowed;
        Ok(())
    }
}
