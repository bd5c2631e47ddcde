//! Pulse Configuration Module
//!
//! Pipeline tunables loaded from a TOML file.
//!
//! ## Loading Order
//!
//! 1. `PULSE_CONFIG` environment variable (path to TOML file)
//! 2. `pulse_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Load once in `main()` and hand each stage the section it needs:
//!
//! ```ignore
//! let config = PulseConfig::load()?;
//! let coordinator = PipelineCoordinator::new(&config, sources)?;
//! ```

mod pulse_config;
pub mod defaults;
pub mod validation;

pub use pulse_config::*;
