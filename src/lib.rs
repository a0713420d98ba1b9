//! flatscene converts a retained-mode 2D scene tree into an ordered stream
//! of immediate-mode drawing commands.
//!
//! A [`Node`] tree is walked depth first. Each node contributes its own
//! drawing calls (fill before stroke), then its graphic and children;
//! transforms, paints, stroke parameters, fonts, and clips are saved on
//! entry and restored on exit, so the emitted stream is valid for any
//! stateful 2D backend. Output goes through the [`Surface`] trait;
//! [`RecordingSurface`] captures it as a comparable command list.
//!
//! ```
//! use flatscene::{Converter, Node, NodeKind, RecordingSurface};
//!
//! let root = Node::group().with_child(Node::new(NodeKind::Circle {
//!     cx: 10.0,
//!     cy: 10.0,
//!     r: 5.0,
//! }));
//! let mut surface = RecordingSurface::new();
//! Converter::new().convert(&root, &mut surface).unwrap();
//! assert!(!surface.commands().is_empty());
//! ```

mod error;
mod geom;
mod listener;
pub mod path;
mod scene;
mod shape;
mod state;
mod style;
mod surface;
mod trace;
mod types;
mod walker;

pub use error::{ConvertError, PathError};
pub use geom::{Affine, Bounds, Segment, segments_bounds};
pub use listener::{ConvertListener, NullListener};
pub use scene::{
    ArcClosure, BackgroundFill, BorderStroke, EffectHandle, Node, NodeKind, PropertyMap,
    PropertyValue, SceneTransform, ShapeAttrs, props,
};
pub use shape::{Shape, shape_of};
pub use state::{ClipRegion, ClipShape};
pub use style::{EffectiveStyle, StrokeStyle, resolve as resolve_style};
pub use surface::{Command, RecordingSurface, Surface};
pub use trace::TraceLogger;
pub use types::{
    Color, CycleMethod, FontPosture, FontSpec, FontWeight, LineCap, LineJoin, Paint, PaintStop, Pt,
};

/// Entry point of a conversion.
///
/// A converter is cheap to build and reusable; the only knob is an optional
/// background color painted over the root's layout bounds before the tree is
/// drawn.
#[derive(Debug, Default, Clone)]
pub struct Converter {
    background: Option<Color>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Convert `root` and everything under it into drawing calls on
    /// `surface`.
    pub fn convert(&self, root: &Node, surface: &mut dyn Surface) -> Result<(), ConvertError> {
        self.convert_with_listener(root, surface, &mut NullListener)
    }

    /// Like [`Converter::convert`], with a listener observing node entry,
    /// exit, and effect brackets.
    pub fn convert_with_listener(
        &self,
        root: &Node,
        surface: &mut dyn Surface,
        listener: &mut dyn ConvertListener,
    ) -> Result<(), ConvertError> {
        walker::convert(root, surface, listener, self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_a_small_scene_end_to_end() {
        let badge = Node::new(NodeKind::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 16.0,
            arc_width: 4.0,
            arc_height: 4.0,
        })
        .with_stroke(Some(Paint::Solid(Color::rgb(0.2, 0.2, 0.2))));
        let label = Node::new(NodeKind::Text {
            x: 4.0,
            y: 12.0,
            text: "ok".to_string(),
        })
        .with_fill(Some(Paint::Solid(Color::rgb(1.0, 1.0, 1.0))));
        let root = Node::group().with_child(badge).with_child(label.at(0.0, 20.0));

        let mut surface = RecordingSurface::new();
        Converter::new()
            .with_background(Color::rgb(1.0, 1.0, 1.0))
            .convert(&root, &mut surface)
            .unwrap();

        let commands = surface.commands();
        // background, badge fill, badge stroke, label text
        assert!(matches!(commands[1], Command::Fill(Shape::Rect { .. })));
        assert!(
            commands
                .iter()
                .any(|c| matches!(c, Command::Fill(Shape::RoundRect { .. })))
        );
        assert!(
            commands
                .iter()
                .any(|c| matches!(c, Command::Stroke(Shape::RoundRect { .. })))
        );
        assert!(commands.iter().any(|c| matches!(c, Command::Text { .. })));
    }

    #[test]
    fn path_nodes_round_trip_through_the_interpreter() {
        let node = Node::new(NodeKind::PathShape {
            data: "M0 0 L10 0 A5 5 0 0 1 20 10 Z".to_string(),
        });
        let mut surface = RecordingSurface::new();
        Converter::new().convert(&node, &mut surface).unwrap();
        let fill = surface
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::Fill(Shape::Path(segs)) => Some(segs.clone()),
                _ => None,
            })
            .expect("path fill");
        assert_eq!(fill.len(), 4);
        assert!(matches!(fill[2], Segment::ArcTo { .. }));
        assert_eq!(fill[3], Segment::Close);
    }

    #[test]
    fn traced_conversion_logs_and_summarizes() {
        let path = std::env::temp_dir().join(format!(
            "flatscene-lib-trace-{}.jsonl",
            std::process::id()
        ));
        let mut logger = TraceLogger::create(&path).unwrap();
        let root = Node::group().with_child(Node::new(NodeKind::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 1.0,
        }));
        let mut surface = RecordingSurface::new();
        Converter::new()
            .convert_with_listener(&root, &mut surface, &mut logger)
            .unwrap();
        logger.emit_summary();

        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(content.contains("\"kind\":\"circle\""));
        assert!(content.contains("\"event\":\"summary\""));
    }
}
