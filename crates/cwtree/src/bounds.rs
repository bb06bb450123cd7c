//! Leftmost and rightmost extremes of the grown tree

use crate::arena::Arena;
use crate::error::GrowthError;
use crate::node::{Node, NodeId};

/// The current extremes of the tree.
///
/// In the Calkin-Wilf tree the smallest value present is always at the end
/// of the all-left chain from the root and the largest at the end of the
/// all-right chain, so neither needs a scan of the whole arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Last node on the all-left chain
    pub leftmost: Node,

    /// Last node on the all-right chain
    pub rightmost: Node,

    /// `floor` of the leftmost value
    pub lower: f64,

    /// `ceil` of the rightmost value
    pub upper: f64,
}

impl Bounds {
    /// Walk both extreme chains of `arena` from the root.
    ///
    /// The caller must make sure no expansion runs during the walk;
    /// [`SharedGrowth::compute_bounds`](crate::SharedGrowth::compute_bounds)
    /// does so by holding the growth lock.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if the arena is empty or a child handle is dangling.
    pub fn compute(arena: &Arena) -> Result<Self, GrowthError> {
        let leftmost = descend(arena, |node| node.left)?;
        let rightmost = descend(arena, |node| node.right)?;
        Ok(Self {
            leftmost,
            rightmost,
            lower: leftmost.value.normalized().floor(),
            upper: rightmost.value.normalized().ceil(),
        })
    }
}

fn descend(arena: &Arena, next: impl Fn(&Node) -> Option<NodeId>) -> Result<Node, GrowthError> {
    let mut node = arena.get(NodeId::ROOT)?;
    while let Some(child) = next(&node) {
        node = arena.get(child)?;
    }
    Ok(node)
}
