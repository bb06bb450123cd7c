//! Growth engine configuration

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rational::Rational;
use crate::state::DEFAULT_CAPACITY;

/// Largest `initial_capacity` a config may request, about four million nodes.
///
/// The tree still grows past this on demand; the limit only bounds the
/// up-front reservation.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 22;

/// Settings for seeding the tree and running the worker pool.
///
/// Every field has a default, so a config file only needs the fields it
/// changes:
///
/// ```
/// use cwtree::GrowthConfig;
///
/// let config: GrowthConfig = serde_json::from_str(r#"{"start": "3/2", "workers": 2}"#).unwrap();
/// assert_eq!(config.start.to_string(), "3/2");
/// assert_eq!(config.workers, 2);
/// assert_eq!(config.step_delay_ms, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Value held by the root
    pub start: Rational,

    /// Number of worker threads
    pub workers: usize,

    /// Sleep before each worker attempt, in milliseconds
    pub step_delay_ms: u64,

    /// Sleep between flag checks while paused, in milliseconds
    pub pause_delay_ms: u64,

    /// Nodes to reserve in the arena up front
    pub initial_capacity: usize,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            start: Rational::ONE,
            workers: 8,
            step_delay_ms: 10,
            pause_delay_ms: 1000,
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl GrowthConfig {
    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Parse` if it is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings the engine cannot run with.
    ///
    /// # Errors
    ///
    /// `Invalid` for zero workers, an `initial_capacity` above
    /// [`MAX_INITIAL_CAPACITY`], or a start value of zero, which is not a
    /// node of the Calkin-Wilf tree and would repeat itself as its own left
    /// child.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "initial_capacity must be at most {MAX_INITIAL_CAPACITY}, got {}",
                self.initial_capacity
            )));
        }
        if self.start.numerator() == 0 {
            return Err(ConfigError::Invalid(format!(
                "start must be a positive rational, got {}",
                self.start
            )));
        }
        Ok(())
    }

    /// Per-attempt throttle.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Poll interval while paused.
    pub fn pause_delay(&self) -> Duration {
        Duration::from_millis(self.pause_delay_ms)
    }
}
