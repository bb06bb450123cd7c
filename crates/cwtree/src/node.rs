//! Tree nodes and the Calkin-Wilf child rule

use std::fmt;

use crate::error::GrowthError;
use crate::rational::Rational;

/// Handle to a node in an [`Arena`](crate::Arena).
///
/// A plain index; the arena checks it on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root is always the first node allocated.
    pub const ROOT: NodeId = NodeId(0);

    /// Wrap a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rational value plus its (possibly not yet computed) children.
///
/// A node starts as a leaf. Its only legal mutation is the single
/// transition to having both children, made by
/// [`Arena::link`](crate::Arena::link); it is immutable after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// The rational this node stands for
    pub value: Rational,

    /// Left child, `None` until expanded
    pub left: Option<NodeId>,

    /// Right child, `None` until expanded
    pub right: Option<NodeId>,
}

impl Node {
    /// A node with no children.
    pub fn leaf(value: Rational) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    /// Both child handles, if the node has been expanded.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        self.left.zip(self.right)
    }

    /// True once both children are present.
    pub fn is_expanded(&self) -> bool {
        self.children().is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Child Rule
// ═══════════════════════════════════════════════════════════════════════

fn sum(value: &Rational) -> Result<u64, GrowthError> {
    value
        .numerator()
        .checked_add(value.denominator())
        .ok_or(GrowthError::ArithmeticOverflow {
            numerator: value.numerator(),
            denominator: value.denominator(),
        })
}

/// Left child of `p/q`: `p/(p+q)`.
///
/// # Errors
///
/// `ArithmeticOverflow` if `p + q` does not fit in a `u64`.
pub fn left_child(value: &Rational) -> Result<Rational, GrowthError> {
    Ok(Rational::new(value.numerator(), sum(value)?)?)
}

/// Right child of `p/q`: `(p+q)/q`.
///
/// # Errors
///
/// `ArithmeticOverflow` if `p + q` does not fit in a `u64`.
pub fn right_child(value: &Rational) -> Result<Rational, GrowthError> {
    Ok(Rational::new(sum(value)?, value.denominator())?)
}
