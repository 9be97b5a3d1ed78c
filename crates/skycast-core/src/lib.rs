//! Shared configuration for skycast.
//!
//! Loads defaults from a TOML file under the platform config directory and
//! validates them before the CLI hands the values to the weather pipeline.

pub mod config;

pub use config::{Config, ConfigValidationError, ValidationResult};
