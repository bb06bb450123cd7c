//! Plain-text rendering of a subtree
//!
//! A node prints as `(value` followed by its left and right children on
//! their own lines, indented two spaces per level, and a closing `)`.
//! Absent children print as `NIL`:
//!
//! ```text
//! (1/1
//!   (1/2
//!     NIL
//!     NIL)
//!   (2/1
//!     NIL
//!     NIL))
//! ```

use std::fmt::Write;

use crate::arena::Arena;
use crate::error::GrowthError;
use crate::node::NodeId;

/// Render the whole subtree under `id`.
///
/// # Errors
///
/// `IndexOutOfRange` on a dangling handle.
pub fn render_subtree(arena: &Arena, id: NodeId) -> Result<String, GrowthError> {
    render_to_depth(arena, id, usize::MAX)
}

/// Render the subtree under `id`, eliding anything deeper than
/// `max_depth` levels below it as `...`.
///
/// # Errors
///
/// `IndexOutOfRange` on a dangling handle.
pub fn render_to_depth(arena: &Arena, id: NodeId, max_depth: usize) -> Result<String, GrowthError> {
    let mut out = String::new();
    write_node(arena, Some(id), 1, max_depth, &mut out)?;
    Ok(out)
}

fn write_node(
    arena: &Arena,
    id: Option<NodeId>,
    depth: usize,
    max_depth: usize,
    out: &mut String,
) -> Result<(), GrowthError> {
    let Some(id) = id else {
        out.push_str("NIL");
        return Ok(());
    };
    let node = arena.get(id)?;
    if depth > max_depth.saturating_add(1) {
        out.push_str("...");
        return Ok(());
    }
    let _ = write!(out, "({}", node.value);
    for child in [node.left, node.right] {
        out.push('\n');
        indent(depth, out);
        write_node(arena, child, depth + 1, max_depth, out)?;
    }
    out.push(')');
    Ok(())
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GrowthState, Rational};

    #[test]
    fn test_render_leaf() {
        let state = GrowthState::new(Rational::ONE).unwrap();
        assert_eq!(
            render_subtree(state.arena(), NodeId::ROOT).unwrap(),
            "(1/1\n  NIL\n  NIL)"
        );
    }

    #[test]
    fn test_render_one_level() {
        let mut state = GrowthState::new(Rational::ONE).unwrap();
        state.expand_one_step().unwrap();
        let expected = "(1/1\n  (1/2\n    NIL\n    NIL)\n  (2/1\n    NIL\n    NIL))";
        assert_eq!(render_subtree(state.arena(), NodeId::ROOT).unwrap(), expected);
    }

    #[test]
    fn test_render_depth_limit() {
        let mut state = GrowthState::new(Rational::ONE).unwrap();
        for _ in 0..3 {
            state.expand_one_step().unwrap();
        }
        let expected = "(1/1\n  ...\n  ...)";
        assert_eq!(render_to_depth(state.arena(), NodeId::ROOT, 0).unwrap(), expected);
    }

    #[test]
    fn test_render_dangling_handle_fails() {
        let state = GrowthState::new(Rational::ONE).unwrap();
        assert!(render_subtree(state.arena(), NodeId::new(3)).is_err());
    }
}
