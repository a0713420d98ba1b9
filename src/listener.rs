//! Conversion progress callbacks.
//!
//! A listener observes the structural envelope of a conversion: node entry
//! and exit, and the bracketing of subtrees that carry a visual effect. All
//! callbacks default to no-ops.

use crate::scene::{EffectHandle, Node};

pub trait ConvertListener {
    fn node_start(&mut self, _node: &Node) {}

    fn node_end(&mut self, _node: &Node) {}

    /// Fired before the drawing calls of a node whose subtree is under a
    /// visual effect. Only fired when an effect is actually present.
    fn effect_start(&mut self, _node: &Node, _effect: &EffectHandle) {}

    fn effect_end(&mut self, _node: &Node) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListener;

impl ConvertListener for NullListener {}
