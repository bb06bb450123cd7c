//! Logging setup for the `cwtree` binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or to a test that wants to see the output).

use tracing::metadata::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Environment variable overriding the verbosity-derived filter.
pub const LOG_ENV_VAR: &str = "CWTREE_LOG";

/// Install a compact stderr subscriber.
///
/// `verbosity` is the number of `-v` flags: 0 logs errors only, 1 adds
/// info, 2 or more adds debug (one event per expansion step). Calling this
/// twice is harmless; the second call keeps the first subscriber.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true);

    let _ = Registry::default().with(filter).with(layer).try_init();
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0), LevelFilter::ERROR);
        assert_eq!(level_from_verbosity(1), LevelFilter::INFO);
        assert_eq!(level_from_verbosity(5), LevelFilter::DEBUG);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(0);
        init(2);
    }
}
