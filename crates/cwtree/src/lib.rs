//! # cwtree
//!
//! Concurrent, incremental enumeration of the Calkin-Wilf tree.
//!
//! The Calkin-Wilf tree is an infinite binary tree holding every positive
//! rational exactly once, in lowest terms. The node `p/q` has left child
//! `p/(p+q)` and right child `(p+q)/q`.
//!
//! ## Architecture
//!
//! - **Rational / Node**: immutable simplified fractions, and nodes holding a
//!   fraction plus two optional child handles
//! - **Arena**: append-only node storage addressed by stable [`NodeId`]s
//! - **Growth state**: the arena, a FIFO frontier of nodes awaiting
//!   expansion and the pause/stop flags, all behind one mutex
//! - **Worker pool**: threads that repeatedly expand the front of the frontier
//! - **Bounds**: the leftmost and rightmost nodes, read under the same lock
//!
//! ## Example
//!
//! ```
//! use cwtree::{GrowthState, Rational};
//!
//! let mut state = GrowthState::new(Rational::ONE).unwrap();
//! for _ in 0..3 {
//!     state.expand_one_step().unwrap();
//! }
//! let values: Vec<String> = state
//!     .arena()
//!     .iter()
//!     .map(|(_, node)| node.value.to_string())
//!     .collect();
//! assert_eq!(values, ["1/1", "1/2", "2/1", "1/3", "2/3", "3/2", "3/1"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod bounds;
pub mod config;
pub mod error;
pub mod node;
pub mod rational;
pub mod render;
pub mod state;
pub mod telemetry;
pub mod worker;

// Re-export main types
pub use arena::Arena;
pub use bounds::Bounds;
pub use config::{GrowthConfig, MAX_INITIAL_CAPACITY};
pub use error::{ConfigError, CwError, GrowthError, RationalError, Result};
pub use node::{left_child, right_child, Node, NodeId};
pub use rational::{gcd, Rational};
pub use render::{render_subtree, render_to_depth};
pub use state::{Expansion, GrowthState, SharedGrowth, Status, Tick, Violation};
pub use worker::{PoolReport, WorkerPhase, WorkerPool};

/// cwtree version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
