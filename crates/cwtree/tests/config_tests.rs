//! Config loading tests

use std::fs;

use cwtree::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_load_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cwtree.json");
    fs::write(&path, r#"{"start": "2/4", "workers": 3}"#).unwrap();

    let config = GrowthConfig::load(&path).unwrap();
    assert_eq!(
        config,
        GrowthConfig {
            start: Rational::new(1, 2).unwrap(),
            workers: 3,
            ..Default::default()
        }
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = GrowthConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_load_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"workers": "many"}"#).unwrap();
    assert!(matches!(
        GrowthConfig::load(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cwtree.json");
    let config = GrowthConfig {
        start: Rational::new(5, 3).unwrap(),
        step_delay_ms: 2,
        ..Default::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    assert_eq!(GrowthConfig::load(&path).unwrap(), config);
}

#[test]
fn test_config_seeds_shared_state() {
    let config = GrowthConfig {
        start: Rational::new(3, 4).unwrap(),
        initial_capacity: 1,
        ..Default::default()
    };
    let growth = SharedGrowth::from_config(&config).unwrap();
    assert_eq!(growth.node(NodeId::ROOT).unwrap().value.to_string(), "3/4");
}

#[test]
fn test_errors_convert_to_top_level() {
    let err: CwError = ConfigError::Invalid("x".into()).into();
    assert_eq!(err.to_string(), "Invalid config: x");
    let err: CwError = GrowthError::LockPoisoned.into();
    assert_eq!(err.to_string(), "Growth lock poisoned");
}

// ═══════════════════════════════════════════════════════════════════════
// Rejected Configs
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_huge_capacity_fails_validation_not_allocation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cwtree.json");
    fs::write(&path, r#"{"initial_capacity": 18446744073709551615}"#).unwrap();

    let config = GrowthConfig::load(&path).unwrap();
    assert_eq!(config.initial_capacity, usize::MAX);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    assert!(matches!(
        SharedGrowth::from_config(&config),
        Err(CwError::Config(ConfigError::Invalid(_)))
    ));

    // Bypassing validation still seeds a tree instead of aborting.
    let state = GrowthState::with_capacity(config.start, config.initial_capacity).unwrap();
    assert_eq!(state.arena().len(), 1);
}

#[test]
fn test_zero_start_rejected_by_from_config() {
    let config = GrowthConfig {
        start: Rational::new(0, 3).unwrap(),
        ..Default::default()
    };
    assert!(matches!(
        SharedGrowth::from_config(&config),
        Err(CwError::Config(ConfigError::Invalid(_)))
    ));
    assert!(matches!(
        GrowthState::new(config.start),
        Err(GrowthError::NonPositiveSeed { .. })
    ));
}
