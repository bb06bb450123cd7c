//! Error types for tree growth

use std::path::PathBuf;

use thiserror::Error;

use crate::rational::Rational;

/// Errors raised while constructing or parsing a [`Rational`](crate::Rational).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RationalError {
    /// A fraction was built with a zero denominator.
    #[error("Invalid denominator: {numerator}/0")]
    InvalidDenominator {
        /// The numerator that was paired with the zero denominator
        numerator: u64,
    },

    /// Text could not be read as `n/d` or `n`.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors raised by the arena, the shared state and the workers.
///
/// Every variant other than `Rational` indicates a broken invariant
/// rather than bad input: once one is reported the tree should be
/// considered suspect and growth stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrowthError {
    /// An arena read at or beyond the current length.
    #[error("Index out of range: {index} (arena length {len})")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Arena length at the time of the read
        len: usize,
    },

    /// `numerator + denominator` no longer fits in a `u64`.
    #[error("Arithmetic overflow expanding {numerator}/{denominator}")]
    ArithmeticOverflow {
        /// Parent numerator
        numerator: u64,
        /// Parent denominator
        denominator: u64,
    },

    /// A node that already has children was linked a second time.
    #[error("Node {index} already expanded")]
    AlreadyExpanded {
        /// Index of the node
        index: usize,
    },

    /// The root value is not a positive rational.
    #[error("Seed must be a positive rational, got {value}")]
    NonPositiveSeed {
        /// The rejected root value
        value: Rational,
    },

    /// Another thread panicked while holding the growth lock.
    #[error("Growth lock poisoned")]
    LockPoisoned,

    /// The OS refused to start a worker thread.
    #[error("Failed to spawn worker {worker}: {reason}")]
    Spawn {
        /// Worker number
        worker: usize,
        /// The OS error, as text
        reason: String,
    },

    /// A worker thread panicked.
    #[error("Worker {worker} panicked")]
    WorkerPanicked {
        /// Worker number
        worker: usize,
    },

    /// Rational construction failed.
    #[error(transparent)]
    Rational(#[from] RationalError),
}

/// Errors raised while loading or validating a [`GrowthConfig`](crate::GrowthConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path of the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for a config.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// Path of the config file
        path: PathBuf,
        /// Underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// A field holds a value the engine cannot run with.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main error type for cwtree operations
///
/// Entry points that both read settings and build a tree, such as
/// [`SharedGrowth::from_config`](crate::SharedGrowth::from_config), return
/// this so callers handle one type.
#[derive(Error, Debug)]
pub enum CwError {
    /// Rational error
    #[error(transparent)]
    Rational(#[from] RationalError),

    /// Growth error
    #[error(transparent)]
    Growth(#[from] GrowthError),

    /// Config error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for cwtree operations
pub type Result<T> = std::result::Result<T, CwError>;
