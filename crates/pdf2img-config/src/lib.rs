//! Configuration loading (spec.md §1A, §6): environment variables with
//! typed parsing and defaults, an optional TOML file overlay, and the
//! env-beats-file precedence the teacher's config crates use. CLI-flag
//! overrides (the highest-precedence layer) are applied by
//! `pdf2img-api`'s `clap::Parser` arguments on top of the loaded config.

pub mod env;
pub mod file;
pub mod service_config;

pub use env::{EnvConfigLoader, EnvError};
pub use file::{FileConfig, FileConfigError};
pub use service_config::{ConfigError, NodeEnv, ServiceConfig};
