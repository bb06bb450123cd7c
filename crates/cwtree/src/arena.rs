//! Append-only node storage

use crate::error::GrowthError;
use crate::node::{Node, NodeId};

/// An append-only, index-addressed store of [`Node`]s.
///
/// Handles are positions in the store and are never reused or moved, so a
/// [`NodeId`] stays valid for the life of the arena. Reads hand out copies;
/// nothing outside the arena holds a reference into it.
///
/// The arena does no locking of its own. Inside a running engine it is only
/// reachable through [`SharedGrowth`](crate::SharedGrowth), which holds the
/// growth lock for every access.
///
/// # Example
///
/// ```
/// use cwtree::{Arena, Node, Rational};
///
/// let mut arena = Arena::new();
/// let root = arena.allocate(Node::leaf(Rational::ONE));
/// let left = arena.allocate(Node::leaf(Rational::new(1, 2).unwrap()));
/// let right = arena.allocate(Node::leaf(Rational::new(2, 1).unwrap()));
/// arena.link(root, left, right).unwrap();
///
/// assert_eq!(arena.len(), 3);
/// assert_eq!(arena.get(root).unwrap().children(), Some((left, right)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty arena with room for `capacity` nodes.
    ///
    /// The reservation is a hint: if it cannot be satisfied the arena falls
    /// back to `fallback` nodes, and failing that starts empty and grows on
    /// demand.
    pub fn with_capacity(capacity: usize, fallback: usize) -> Self {
        let mut nodes = Vec::new();
        if let Err(err) = nodes.try_reserve_exact(capacity) {
            tracing::warn!(capacity, fallback, error = %err, "arena reservation failed");
            // A failed reservation leaves the vector untouched.
            if nodes.try_reserve_exact(fallback.min(capacity)).is_err() {
                tracing::warn!(fallback, "fallback reservation failed, growing on demand");
            }
        }
        Self { nodes }
    }

    /// Append `node` and return its new handle.
    pub fn allocate(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Copy of the node behind `id`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `id` was never allocated by this arena.
    pub fn get(&self, id: NodeId) -> Result<Node, GrowthError> {
        self.nodes
            .get(id.index())
            .copied()
            .ok_or(GrowthError::IndexOutOfRange {
                index: id.index(),
                len: self.nodes.len(),
            })
    }

    /// Publish `left` and `right` as the children of `parent`.
    ///
    /// Both children must already be allocated, so a reader never finds a
    /// child handle pointing past the end of the arena. Re-linking a child
    /// slot to the handle it already holds is allowed; changing it is not.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if any of the three handles is not allocated
    /// - `AlreadyExpanded` if `parent` already holds different children
    pub fn link(&mut self, parent: NodeId, left: NodeId, right: NodeId) -> Result<(), GrowthError> {
        self.get(left)?;
        self.get(right)?;
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(parent.index())
            .ok_or(GrowthError::IndexOutOfRange {
                index: parent.index(),
                len,
            })?;
        let conflicts = |slot: Option<NodeId>, new: NodeId| slot.is_some_and(|old| old != new);
        if conflicts(node.left, left) || conflicts(node.right, right) {
            return Err(GrowthError::AlreadyExpanded {
                index: parent.index(),
            });
        }
        node.left = Some(left);
        node.right = Some(right);
        Ok(())
    }

    /// Number of nodes allocated so far. Never decreases.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node with its handle, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rational;

    fn leaf(n: u64, d: u64) -> Node {
        Node::leaf(Rational::new(n, d).unwrap())
    }

    #[test]
    fn test_allocate_assigns_sequential_ids() {
        let mut arena = Arena::with_capacity(4, 4);
        assert!(arena.is_empty());
        assert_eq!(arena.allocate(leaf(1, 1)), NodeId::ROOT);
        assert_eq!(arena.allocate(leaf(1, 2)), NodeId::new(1));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_oversized_reservation_falls_back() {
        let mut arena = Arena::with_capacity(usize::MAX, 16);
        assert!(arena.is_empty());
        assert!(arena.nodes.capacity() >= 16);
        assert_eq!(arena.allocate(leaf(1, 1)), NodeId::ROOT);
    }

    #[test]
    fn test_get_out_of_range_fails() {
        let mut arena = Arena::new();
        arena.allocate(leaf(1, 1));
        assert_eq!(
            arena.get(NodeId::new(5)),
            Err(GrowthError::IndexOutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn test_link_requires_allocated_children() {
        let mut arena = Arena::new();
        let root = arena.allocate(leaf(1, 1));
        let left = arena.allocate(leaf(1, 2));
        let err = arena.link(root, left, NodeId::new(2)).unwrap_err();
        assert_eq!(err, GrowthError::IndexOutOfRange { index: 2, len: 2 });
        // Nothing was published.
        assert_eq!(arena.get(root).unwrap().children(), None);
    }

    #[test]
    fn test_link_twice_with_other_children_fails() {
        let mut arena = Arena::new();
        let root = arena.allocate(leaf(1, 1));
        let a = arena.allocate(leaf(1, 2));
        let b = arena.allocate(leaf(2, 1));
        arena.link(root, a, b).unwrap();
        arena.link(root, a, b).unwrap();
        assert_eq!(
            arena.link(root, b, a),
            Err(GrowthError::AlreadyExpanded { index: 0 })
        );
    }

    #[test]
    fn test_iter_in_allocation_order() {
        let mut arena = Arena::new();
        arena.allocate(leaf(1, 1));
        arena.allocate(leaf(1, 2));
        let ids: Vec<usize> = arena.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
