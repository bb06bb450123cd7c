//! Shared growth state and the expansion step
//!
//! [`GrowthState`] holds everything that changes while the tree grows: the
//! arena, the frontier and the control flags. It is plain data with no
//! locking, which keeps the expansion algorithm deterministic and easy to
//! test single-threaded.
//!
//! [`SharedGrowth`] puts one `GrowthState` behind a single mutex and is the
//! handle handed to workers and readers. Every method acquires the lock
//! once and holds it for the whole operation, so a reader sees the tree as
//! of some point between two expansion steps and never mid-step.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::arena::Arena;
use crate::bounds::Bounds;
use crate::config::GrowthConfig;
use crate::error::GrowthError;
use crate::node::{left_child, right_child, Node, NodeId};
use crate::rational::Rational;

/// Arena capacity reserved when none is configured.
pub const DEFAULT_CAPACITY: usize = 256;

/// Record of one completed expansion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    /// The node that was expanded
    pub parent: NodeId,

    /// Its new left child
    pub left: NodeId,

    /// Its new right child
    pub right: NodeId,

    /// Values of left child, parent and right child, in that order
    pub values: (Rational, Rational, Rational),
}

/// Outcome of one worker attempt against the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The stop flag is set
    Stopped,

    /// The pause flag is set; nothing was done
    Paused,

    /// The frontier was empty; nothing was done
    Idle,

    /// One node was expanded
    Expanded(Expansion),
}

/// A broken structural invariant found by [`GrowthState::audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Exactly one of the two child slots is set
    HalfLinked {
        /// The node
        node: NodeId,
    },

    /// A child handle points at or past the end of the arena
    DanglingChild {
        /// The parent
        parent: NodeId,
        /// The bad child handle
        child: NodeId,
    },

    /// A node is claimed as a child more than once, or the root is claimed
    SharedChild {
        /// The node claimed twice
        child: NodeId,
    },

    /// A child's value does not follow the `p/(p+q)`, `(p+q)/q` rule
    WrongChildValue {
        /// The parent
        parent: NodeId,
    },

    /// Two nodes hold the same rational
    DuplicateValue {
        /// The value
        value: Rational,
    },

    /// The node count is not `1 + 2k`
    UnevenCount {
        /// The arena length
        len: usize,
    },
}

/// A child slot during expansion: already linked, or about to be allocated.
enum Slot {
    Existing(NodeId),
    New(Rational),
}

/// Everything the growth engine mutates, without any locking.
#[derive(Debug, Clone)]
pub struct GrowthState {
    arena: Arena,
    frontier: VecDeque<NodeId>,
    paused: bool,
    stopped: bool,
    last_expansion: Option<Expansion>,
    fault: Option<GrowthError>,
}

impl GrowthState {
    /// Seed a tree whose root holds `start`.
    ///
    /// # Errors
    ///
    /// `NonPositiveSeed` if `start` is zero.
    pub fn new(start: Rational) -> Result<Self, GrowthError> {
        Self::with_capacity(start, DEFAULT_CAPACITY)
    }

    /// Seed a tree, reserving room for `capacity` nodes up front.
    ///
    /// The reservation falls back to [`DEFAULT_CAPACITY`] if it cannot be
    /// satisfied.
    ///
    /// # Errors
    ///
    /// `NonPositiveSeed` if `start` is zero. Zero is not in the Calkin-Wilf
    /// tree and is its own left child, so every value would repeat.
    pub fn with_capacity(start: Rational, capacity: usize) -> Result<Self, GrowthError> {
        if start.numerator() == 0 {
            return Err(GrowthError::NonPositiveSeed { value: start });
        }
        let mut arena = Arena::with_capacity(capacity.max(1), DEFAULT_CAPACITY);
        let root = arena.allocate(Node::leaf(start));
        let mut frontier = VecDeque::new();
        frontier.push_back(root);
        Ok(Self {
            arena,
            frontier,
            paused: false,
            stopped: false,
            last_expansion: None,
            fault: None,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expansion
    // ═══════════════════════════════════════════════════════════════════

    /// Expand the node at the front of the frontier.
    ///
    /// Returns `Ok(None)` when the frontier is empty. The step is all or
    /// nothing: child values are computed before anything is popped or
    /// allocated, so a failure leaves the state exactly as it was.
    ///
    /// Pause and stop flags are not consulted here; see [`GrowthState::tick`].
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if the frontier holds a handle the arena lacks
    /// - `AlreadyExpanded` if the front of the frontier already has children
    /// - `ArithmeticOverflow` if a child value does not fit in a `u64`
    pub fn expand_one_step(&mut self) -> Result<Option<Expansion>, GrowthError> {
        let Some(&parent) = self.frontier.front() else {
            return Ok(None);
        };
        let node = self.arena.get(parent)?;
        if node.is_expanded() {
            return Err(GrowthError::AlreadyExpanded {
                index: parent.index(),
            });
        }

        let left = match node.left {
            Some(id) => Slot::Existing(id),
            None => Slot::New(left_child(&node.value)?),
        };
        let right = match node.right {
            Some(id) => Slot::Existing(id),
            None => Slot::New(right_child(&node.value)?),
        };

        self.frontier.pop_front();
        // Children are allocated before the parent links to them.
        let left = self.place(left);
        let right = self.place(right);
        self.arena.link(parent, left, right)?;
        self.frontier.push_back(left);
        self.frontier.push_back(right);

        let expansion = Expansion {
            parent,
            left,
            right,
            values: (
                self.arena.get(left)?.value,
                node.value,
                self.arena.get(right)?.value,
            ),
        };
        tracing::debug!(
            parent = parent.index(),
            value = %node.value,
            left = left.index(),
            right = right.index(),
            "expanded node"
        );
        self.last_expansion = Some(expansion);
        Ok(Some(expansion))
    }

    fn place(&mut self, slot: Slot) -> NodeId {
        match slot {
            Slot::Existing(id) => id,
            Slot::New(value) => self.arena.allocate(Node::leaf(value)),
        }
    }

    /// One worker attempt: honour the flags, otherwise expand.
    ///
    /// # Errors
    ///
    /// As [`GrowthState::expand_one_step`].
    pub fn tick(&mut self) -> Result<Tick, GrowthError> {
        if self.stopped {
            return Ok(Tick::Stopped);
        }
        if self.paused {
            return Ok(Tick::Paused);
        }
        Ok(match self.expand_one_step()? {
            Some(expansion) => Tick::Expanded(expansion),
            None => Tick::Idle,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Flags
    // ═══════════════════════════════════════════════════════════════════

    /// Set or clear the pause flag.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Set the stop flag. There is no way to clear it.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Check the pause flag.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Check the stop flag.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Record a failed step and stop all growth.
    fn record_fault(&mut self, err: &GrowthError) {
        if self.fault.is_none() {
            self.fault = Some(err.clone());
        }
        self.stopped = true;
    }

    /// The first error any step hit, if any.
    pub fn fault(&self) -> Option<&GrowthError> {
        self.fault.as_ref()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// The node store.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Handles awaiting expansion, front first.
    pub fn frontier(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.frontier.iter().copied()
    }

    /// Number of handles awaiting expansion.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// The most recent successful expansion.
    pub fn last_expansion(&self) -> Option<Expansion> {
        self.last_expansion
    }

    /// Values of every node reachable from the root, pre-order, left first.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` on a dangling child handle.
    pub fn traverse(&self) -> Result<Vec<Rational>, GrowthError> {
        let mut values = Vec::with_capacity(self.arena.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = self.arena.get(id)?;
            values.push(node.value);
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
        Ok(values)
    }

    /// Check the structural invariants of the whole tree.
    ///
    /// An empty result means every node is a leaf or fully linked to two
    /// allocated children with the right values, no node has two parents,
    /// no value repeats and the node count is odd.
    pub fn audit(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let len = self.arena.len();
        if len % 2 == 0 {
            violations.push(Violation::UnevenCount { len });
        }

        let mut claimed = HashSet::from([NodeId::ROOT]);
        let mut seen = HashSet::with_capacity(len);
        for (id, node) in self.arena.iter() {
            if !seen.insert(node.value) {
                violations.push(Violation::DuplicateValue { value: node.value });
            }
            let (left, right) = match (node.left, node.right) {
                (None, None) => continue,
                (Some(left), Some(right)) => (left, right),
                _ => {
                    violations.push(Violation::HalfLinked { node: id });
                    continue;
                }
            };
            for child in [left, right] {
                if !claimed.insert(child) {
                    violations.push(Violation::SharedChild { child });
                }
            }
            match (self.arena.get(left), self.arena.get(right)) {
                (Ok(l), Ok(r)) => {
                    let expected = (left_child(&node.value), right_child(&node.value));
                    if expected != (Ok(l.value), Ok(r.value)) {
                        violations.push(Violation::WrongChildValue { parent: id });
                    }
                }
                (l, _) => {
                    let child = if l.is_err() { left } else { right };
                    violations.push(Violation::DanglingChild { parent: id, child });
                }
            }
        }
        violations
    }
}

/// Thread-safe handle to one [`GrowthState`].
///
/// Cloning is cheap and every clone refers to the same tree. All access goes
/// through a single mutex guarding the arena, the frontier and both flags
/// together.
///
/// # Example
///
/// ```
/// use cwtree::{Rational, SharedGrowth};
///
/// let growth = SharedGrowth::new(Rational::ONE).unwrap();
/// growth.expand_one_step().unwrap();
///
/// assert_eq!(growth.len().unwrap(), 3);
/// let bounds = growth.compute_bounds().unwrap();
/// assert_eq!(bounds.leftmost.value.to_string(), "1/2");
/// assert_eq!(bounds.rightmost.value.to_string(), "2/1");
/// ```
#[derive(Debug, Clone)]
pub struct SharedGrowth {
    inner: Arc<Mutex<GrowthState>>,
}

/// A snapshot of the counters and flags a status display needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    /// Nodes in the arena
    pub count: usize,

    /// Expansion steps performed, `(count - 1) / 2`
    pub iterations: usize,

    /// Handles awaiting expansion
    pub frontier: usize,

    /// Pause flag
    pub paused: bool,

    /// Stop flag
    pub stopped: bool,

    /// Current extremes
    pub bounds: Bounds,

    /// Most recent expansion
    pub last_expansion: Option<Expansion>,
}

impl SharedGrowth {
    /// Seed a shared tree whose root holds `start`.
    ///
    /// # Errors
    ///
    /// `NonPositiveSeed` if `start` is zero.
    pub fn new(start: Rational) -> Result<Self, GrowthError> {
        GrowthState::new(start).map(Self::from_state)
    }

    /// Validate `config`, then seed a shared tree from its start value and
    /// capacity.
    ///
    /// # Errors
    ///
    /// `CwError::Config` if [`GrowthConfig::validate`] rejects the config.
    pub fn from_config(config: &GrowthConfig) -> crate::Result<Self> {
        config.validate()?;
        let state = GrowthState::with_capacity(config.start, config.initial_capacity)?;
        Ok(Self::from_state(state))
    }

    /// Share an existing state.
    pub fn from_state(state: GrowthState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, GrowthState>, GrowthError> {
        self.inner.lock().map_err(|_| GrowthError::LockPoisoned)
    }

    /// Run `f` against the state with the lock held.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` if a thread panicked while holding the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&GrowthState) -> R) -> Result<R, GrowthError> {
        let state = self.lock()?;
        Ok(f(&state))
    }

    /// Expand the front of the frontier, regardless of the pause flag.
    ///
    /// A failure is recorded as the state's fault and sets the stop flag, so
    /// running workers wind down instead of growing a suspect tree.
    ///
    /// # Errors
    ///
    /// As [`GrowthState::expand_one_step`], plus `LockPoisoned`.
    pub fn expand_one_step(&self) -> Result<Option<Expansion>, GrowthError> {
        let mut state = self.lock()?;
        let result = state.expand_one_step();
        if let Err(err) = &result {
            state.record_fault(err);
        }
        result
    }

    /// One worker attempt; see [`GrowthState::tick`].
    ///
    /// # Errors
    ///
    /// As [`SharedGrowth::expand_one_step`].
    pub fn tick(&self) -> Result<Tick, GrowthError> {
        let mut state = self.lock()?;
        let result = state.tick();
        if let Err(err) = &result {
            state.record_fault(err);
        }
        result
    }

    /// Find the current extremes under the lock.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`, or `IndexOutOfRange` on a corrupted arena.
    pub fn compute_bounds(&self) -> Result<Bounds, GrowthError> {
        let state = self.lock()?;
        Bounds::compute(&state.arena)
    }

    /// Copy of the node behind `id`.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` or `IndexOutOfRange`.
    pub fn node(&self, id: NodeId) -> Result<Node, GrowthError> {
        self.lock()?.arena.get(id)
    }

    /// Current node count.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn len(&self) -> Result<usize, GrowthError> {
        Ok(self.lock()?.arena.len())
    }

    /// Values of every reachable node, taken under one lock acquisition.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` or `IndexOutOfRange`.
    pub fn traverse(&self) -> Result<Vec<Rational>, GrowthError> {
        self.lock()?.traverse()
    }

    /// Counters, flags and bounds, all from the same instant.
    ///
    /// # Errors
    ///
    /// `LockPoisoned` or `IndexOutOfRange`.
    pub fn status(&self) -> Result<Status, GrowthError> {
        let state = self.lock()?;
        let count = state.arena.len();
        Ok(Status {
            count,
            iterations: count.saturating_sub(1) / 2,
            frontier: state.frontier.len(),
            paused: state.paused,
            stopped: state.stopped,
            bounds: Bounds::compute(&state.arena)?,
            last_expansion: state.last_expansion,
        })
    }

    /// The most recent successful expansion.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn last_expansion(&self) -> Result<Option<Expansion>, GrowthError> {
        Ok(self.lock()?.last_expansion)
    }

    /// The first error a step hit, if any.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn fault(&self) -> Result<Option<GrowthError>, GrowthError> {
        Ok(self.lock()?.fault.clone())
    }

    /// Suspend expansion. Queued work is kept.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn pause(&self) -> Result<(), GrowthError> {
        self.lock()?.set_paused(true);
        tracing::info!("growth paused");
        Ok(())
    }

    /// Resume expansion after [`SharedGrowth::pause`].
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn resume(&self) -> Result<(), GrowthError> {
        self.lock()?.set_paused(false);
        tracing::info!("growth resumed");
        Ok(())
    }

    /// Ask every worker to terminate.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn stop(&self) -> Result<(), GrowthError> {
        self.lock()?.stop();
        tracing::info!("growth stopped");
        Ok(())
    }

    /// Check the pause flag.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn is_paused(&self) -> Result<bool, GrowthError> {
        Ok(self.lock()?.paused)
    }

    /// Check the stop flag.
    ///
    /// # Errors
    ///
    /// `LockPoisoned`.
    pub fn is_stopped(&self) -> Result<bool, GrowthError> {
        Ok(self.lock()?.stopped)
    }
}
