//! Pulse Configuration - every pipeline tunable as a TOML value
//!
//! Each section implements `Default` with the stock values so a missing
//! file, a missing section, or a missing key all fall back cleanly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PULSE_CONFIG";

/// Config file picked up from the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pulse_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a pipeline deployment.
///
/// Load with `PulseConfig::load()` which searches:
/// 1. `$PULSE_CONFIG` env var
/// 2. `./pulse_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Source fan-out bounds
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Chunked sentiment scoring
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Keyword vocabulary and detection gate
    #[serde(default)]
    pub trends: TrendConfig,

    /// Cycle cadence and retention
    #[serde(default)]
    pub cycle: CycleConfig,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,

    /// Simulated platform sources
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl PulseConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PULSE_CONFIG` environment variable
    /// 2. `./pulse_config.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A file that exists but fails to parse or validate is an error, not a
    /// fallback. Only a missing file falls through to the next step.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), "Loaded pulse config from {}", CONFIG_ENV_VAR);
                return Ok(config);
            }
            warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!("Loaded pulse config from ./{}", LOCAL_CONFIG_FILE);
            return Ok(config);
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Syntax(inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(ConfigError::Syntax)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all tunables for internal consistency.
    ///
    /// Every violated rule is reported, not just the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let c = &self.collection;
        if c.overall_timeout_secs == 0 {
            errors.push("collection.overall_timeout_secs must be > 0".to_string());
        }
        if c.per_source_timeout_secs == 0 {
            errors.push("collection.per_source_timeout_secs must be > 0".to_string());
        }

        let s = &self.scoring;
        if s.chunk_size == 0 {
            errors.push("scoring.chunk_size must be > 0".to_string());
        }
        if s.max_workers == 0 {
            errors.push("scoring.max_workers must be > 0".to_string());
        }

        let t = &self.trends;
        if t.keywords.is_empty() {
            errors.push("trends.keywords must contain at least one keyword".to_string());
        }
        if t.keywords.iter().any(|k| k.trim().is_empty()) {
            errors.push("trends.keywords must not contain blank entries".to_string());
        }
        if !t.growth_threshold.is_finite() {
            errors.push(format!(
                "trends.growth_threshold must be a finite number (got {})",
                t.growth_threshold
            ));
        }
        if t.max_signals == 0 {
            errors.push("trends.max_signals must be > 0".to_string());
        }
        if t.confidence_volume == 0 {
            errors.push("trends.confidence_volume must be > 0 (used as divisor)".to_string());
        }

        let cy = &self.cycle;
        if cy.prune_every == 0 {
            errors.push("cycle.prune_every must be > 0".to_string());
        }
        if cy.active_window_hours == 0 {
            errors.push("cycle.active_window_hours must be > 0".to_string());
        }
        if cy.active_window_hours > cy.retention_days.saturating_mul(24) {
            errors.push(format!(
                "cycle.active_window_hours ({}) must not exceed retention ({} days)",
                cy.active_window_hours, cy.retention_days
            ));
        }

        let sv = &self.server;
        if sv.recent_max_limit == 0 {
            errors.push("server.recent_max_limit must be > 0".to_string());
        }
        if sv.recent_default_limit > sv.recent_max_limit {
            errors.push(format!(
                "server.recent_default_limit ({}) must be <= recent_max_limit ({})",
                sv.recent_default_limit, sv.recent_max_limit
            ));
        }

        let sim = &self.simulation;
        if sim.min_delay_ms > sim.max_delay_ms {
            errors.push(format!(
                "simulation.min_delay_ms ({}) must be <= max_delay_ms ({})",
                sim.min_delay_ms, sim.max_delay_ms
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config parse error: {0}")]
    Syntax(#[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Collection
// ============================================================================

/// Wait bounds for the collection fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Upper bound on the whole fan-out (seconds)
    #[serde(default = "default_overall_timeout")]
    pub overall_timeout_secs: u64,

    /// Upper bound on any single source (seconds)
    #[serde(default = "default_per_source_timeout")]
    pub per_source_timeout_secs: u64,
}

fn default_overall_timeout() -> u64 { 120 }
fn default_per_source_timeout() -> u64 { 30 }

impl CollectionConfig {
    pub const fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }

    pub const fn per_source_timeout(&self) -> Duration {
        Duration::from_secs(self.per_source_timeout_secs)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            overall_timeout_secs: default_overall_timeout(),
            per_source_timeout_secs: default_per_source_timeout(),
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Chunking and worker-pool sizing for sentiment scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Posts per contiguous chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Scoring worker threads
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_chunk_size() -> usize { 50 }
fn default_max_workers() -> usize { 4 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_workers: default_max_workers(),
        }
    }
}

// ============================================================================
// Trends
// ============================================================================

/// Keyword vocabulary and the trend detection gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Tracked keywords, matched case-insensitively as substrings
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Minimum mentions per cycle before a keyword can trend
    #[serde(default = "default_min_volume")]
    pub min_volume: u64,

    /// Growth above this qualifies a keyword
    #[serde(default = "default_growth_threshold")]
    pub growth_threshold: f64,

    /// Mentions above this qualify a keyword regardless of growth
    #[serde(default = "default_volume_override")]
    pub volume_override: u64,

    /// Signals kept after ranking
    #[serde(default = "default_max_signals")]
    pub max_signals: usize,

    /// Context snippets kept per signal
    #[serde(default = "default_max_phrases")]
    pub max_phrases: usize,

    /// Characters of context captured either side of a keyword
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,

    /// Volume at which confidence saturates at 1.0
    #[serde(default = "default_confidence_volume")]
    pub confidence_volume: u64,
}

pub(crate) fn default_keywords() -> Vec<String> {
    [
        "AI", "blockchain", "crypto", "NFT", "metaverse", "sustainable", "eco", "climate",
        "green", "remote", "hybrid", "startup", "SaaS", "gaming", "esports", "streaming",
        "fashion", "vintage", "thrift",
    ]
    .iter()
    .map(|k| (*k).to_string())
    .collect()
}
fn default_min_volume() -> u64 { 5 }
fn default_growth_threshold() -> f64 { 0.5 }
fn default_volume_override() -> u64 { 20 }
fn default_max_signals() -> usize { 10 }
fn default_max_phrases() -> usize { 3 }
fn default_context_chars() -> usize { 30 }
fn default_confidence_volume() -> u64 { 50 }

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            min_volume: default_min_volume(),
            growth_threshold: default_growth_threshold(),
            volume_override: default_volume_override(),
            max_signals: default_max_signals(),
            max_phrases: default_max_phrases(),
            context_chars: default_context_chars(),
            confidence_volume: default_confidence_volume(),
        }
    }
}

// ============================================================================
// Cycle
// ============================================================================

/// Cadence, history windows, and dashboard payload sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Pause between successful cycles (seconds)
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,

    /// Pause after a failed cycle (seconds)
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,

    /// Posts newer than this feed the live summary (hours)
    #[serde(default = "default_active_window_hours")]
    pub active_window_hours: u64,

    /// History older than this is pruned (days)
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Prune on every Nth iteration
    #[serde(default = "default_prune_every")]
    pub prune_every: u64,

    /// Newest active-window posts kept in each snapshot
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,

    /// Posts per `new_posts` dashboard event
    #[serde(default = "default_new_posts_tail")]
    pub new_posts_tail: usize,

    /// Start cycling as soon as the service is up
    #[serde(default)]
    pub autostart: bool,
}

fn default_update_interval() -> u64 { 30 }
fn default_error_backoff() -> u64 { 30 }
fn default_active_window_hours() -> u64 { 24 }
fn default_retention_days() -> u64 { 7 }
fn default_prune_every() -> u64 { 10 }
fn default_recent_capacity() -> usize { 100 }
fn default_new_posts_tail() -> usize { 10 }

impl CycleConfig {
    pub const fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub const fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn active_window(&self) -> chrono::Duration {
        i64::try_from(self.active_window_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn retention(&self) -> chrono::Duration {
        i64::try_from(self.retention_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval(),
            error_backoff_secs: default_error_backoff(),
            active_window_hours: default_active_window_hours(),
            retention_days: default_retention_days(),
            prune_every: default_prune_every(),
            recent_capacity: default_recent_capacity(),
            new_posts_tail: default_new_posts_tail(),
            autostart: false,
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (overridden by `PULSE_SERVER_ADDR` / `--addr`)
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// `limit` used by `/api/posts/recent` when none is given
    #[serde(default = "default_recent_default_limit")]
    pub recent_default_limit: usize,

    /// Hard cap on `/api/posts/recent?limit=`
    #[serde(default = "default_recent_max_limit")]
    pub recent_max_limit: usize,
}

fn default_server_addr() -> String {
    "0.0.0.0:5000".to_string()
}
fn default_recent_default_limit() -> usize { 20 }
fn default_recent_max_limit() -> usize { 100 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            recent_default_limit: default_recent_default_limit(),
            recent_max_limit: default_recent_max_limit(),
        }
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// Simulated platform sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// RNG seed; each source derives its own stream from it. Unset = entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Artificial latency lower bound per collection (ms)
    #[serde(default)]
    pub min_delay_ms: u64,

    /// Artificial latency upper bound per collection (ms)
    #[serde(default)]
    pub max_delay_ms: u64,
}
