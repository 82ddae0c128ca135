//! Configuration loading for the teamleader client.
//!
//! Uses figment for YAML-based configuration with sensible defaults,
//! overridable through `TEAMLEADER_*` environment variables.

pub mod schema;

pub use schema::{Config, ConfigError, LogConfig};
