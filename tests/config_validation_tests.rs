//! Config Validation Tests
//!
//! Loading `PulseConfig` from files on disk, unknown-key detection with
//! suggestions, and range validation.

use std::io::Write;

use social_pulse::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use social_pulse::config::{ConfigError, PulseConfig};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_scoring_key_warns_with_suggestion() {
    let toml_str = r#"
[scoring]
chunk_sise = 25
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "scoring.chunk_sise");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("scoring.chunk_size"));
}

#[test]
fn typo_in_section_name_is_suggested() {
    let warnings = validate_unknown_keys("[trend]\nmin_volume = 3\n");
    let section = warnings.iter().find(|w| w.field == "trend").expect("section warning");
    assert_eq!(section.suggestion.as_deref(), Some("trends"));
}

#[test]
fn warning_display_includes_suggestion() {
    let warnings = validate_unknown_keys("[cycle]\nprune_evry = 5\n");
    assert_eq!(warnings.len(), 1);
    let text = warnings[0].to_string();
    assert!(text.contains("cycle.prune_evry"), "{text}");
    assert!(text.contains("did you mean 'cycle.prune_every'"), "{text}");
}

#[test]
fn distant_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("completely.unrelated.key", &known).is_none());
}

#[test]
fn typo_does_not_block_loading() {
    let config = PulseConfig::from_toml_str("[server]\nadress = \"127.0.0.1:9\"\n").unwrap();
    assert_eq!(config.server.addr, "0.0.0.0:5000");
}

// ============================================================================
// Loading From Disk
// ============================================================================

#[test]
fn load_from_file_applies_overrides() {
    let file = write_config(
        r#"
[collection]
per_source_timeout_secs = 5

[trends]
keywords = ["rust", "tokio"]
min_volume = 2

[cycle]
update_interval_secs = 10
autostart = true

[simulation]
seed = 42
"#,
    );

    let config = PulseConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.collection.per_source_timeout_secs, 5);
    assert_eq!(config.collection.overall_timeout_secs, 120);
    assert_eq!(config.trends.keywords, vec!["rust", "tokio"]);
    assert_eq!(config.trends.min_volume, 2);
    assert_eq!(config.cycle.update_interval_secs, 10);
    assert!(config.cycle.autostart);
    assert_eq!(config.simulation.seed, Some(42));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = PulseConfig::load_from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(..))));
}

#[test]
fn malformed_file_reports_path() {
    let file = write_config("[scoring\nchunk_size = 1\n");
    match PulseConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn invalid_values_in_file_are_rejected() {
    let file = write_config(
        r#"
[scoring]
max_workers = 0

[simulation]
min_delay_ms = 500
max_delay_ms = 100
"#,
    );
    match PulseConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 2, "got: {errors:?}");
            assert!(errors.iter().any(|e| e.contains("max_workers")));
            assert!(errors.iter().any(|e| e.contains("min_delay_ms")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn blank_keyword_is_rejected() {
    let result = PulseConfig::from_toml_str("[trends]\nkeywords = [\"AI\", \"  \"]\n");
    let err = result.unwrap_err().to_string();
    assert!(err.contains("blank"), "{err}");
}

#[test]
fn written_config_loads_back() {
    let mut config = PulseConfig::default();
    config.cycle.prune_every = 3;
    config.server.recent_default_limit = 50;
    let file = write_config(&config.to_toml().unwrap());

    let loaded = PulseConfig::load_from_file(file.path()).unwrap();
    assert_eq!(loaded.cycle.prune_every, 3);
    assert_eq!(loaded.server.recent_default_limit, 50);
}
