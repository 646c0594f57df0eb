use crate::env::EnvConfigLoader;
use crate::file::{FileConfig, FileConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] crate::env::EnvError),
    #[error(transparent)]
    File(#[from] FileConfigError),
}

/// Top-level process configuration (spec.md §6 environment variables).
/// Precedence, lowest to highest: built-in defaults < `--config` file
/// overlay < environment variables < explicit CLI flags. The first three
/// layers are resolved by [`ServiceConfig::load`]; CLI flags are applied
/// by the caller (the `pdf2img-api` binary's `clap::Parser` arguments)
/// overwriting individual fields afterward, since only the binary crate
/// knows which flags the operator actually passed.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_inflight: usize,
    pub queue_limit: usize,
    pub cpu_threshold: f32,
    pub memory_threshold: f32,
    pub output_dir: String,
    pub node_env: NodeEnv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEnv {
    Development,
    Production,
}

impl NodeEnv {
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => NodeEnv::Production,
            _ => NodeEnv::Development,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_inflight: num_cpus_hint(),
            queue_limit: 100,
            cpu_threshold: 85.0,
            memory_threshold: 85.0,
            output_dir: "./output".to_string(),
            node_env: NodeEnv::Development,
        }
    }
}

fn num_cpus_hint() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4).max(4)
}

impl ServiceConfig {
    /// Loads defaults, overlays an optional config file, then overlays
    /// `PDF2IMG_`-prefixed environment variables (env beats file, per
    /// spec.md §1A). `NODE_ENV` is additionally honored unprefixed, since
    /// spec.md §6 names it bare as an external-interface contract.
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_file {
            let file = FileConfig::load(path)?;
            config.apply_file(file);
        }

        let env = EnvConfigLoader::new().with_prefix("PDF2IMG_");
        config.apply_env(&env)?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.max_inflight {
            self.max_inflight = v;
        }
        if let Some(v) = file.queue_limit {
            self.queue_limit = v;
        }
        if let Some(v) = file.cpu_threshold {
            self.cpu_threshold = v;
        }
        if let Some(v) = file.memory_threshold {
            self.memory_threshold = v;
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = file.node_env {
            self.node_env = NodeEnv::parse(&v);
        }
    }

    fn apply_env(&mut self, env: &EnvConfigLoader) -> Result<(), ConfigError> {
        if let Some(v) = env.get_optional("MAX_INFLIGHT") {
            self.max_inflight = v.parse().map_err(|_| crate::env::EnvError::InvalidValue {
                var: "PDF2IMG_MAX_INFLIGHT".to_string(),
                reason: "not a positive integer".to_string(),
            })?;
        }
        if let Some(v) = env.get_optional("QUEUE_LIMIT") {
            self.queue_limit = v.parse().map_err(|_| crate::env::EnvError::InvalidValue {
                var: "PDF2IMG_QUEUE_LIMIT".to_string(),
                reason: "not a positive integer".to_string(),
            })?;
        }
        if let Some(v) = env.get_optional("CPU_THRESHOLD") {
            self.cpu_threshold = v.parse().map_err(|_| crate::env::EnvError::InvalidValue {
                var: "PDF2IMG_CPU_THRESHOLD".to_string(),
                reason: "not a number".to_string(),
            })?;
        }
        if let Some(v) = env.get_optional("MEMORY_THRESHOLD") {
            self.memory_threshold = v.parse().map_err(|_| crate::env::EnvError::InvalidValue {
                var: "PDF2IMG_MEMORY_THRESHOLD".to_string(),
                reason: "not a number".to_string(),
            })?;
        }
        if let Some(v) = env.get_optional("OUTPUT_DIR") {
            self.output_dir = v;
        }
        // `NODE_ENV` is named bare in spec.md §6 and gates dev-vs-prod sink
        // output; honor it unprefixed (the standard ecosystem convention)
        // as well as the `PDF2IMG_`-prefixed form, which wins if both are set.
        if let Some(v) = env.get_optional("NODE_ENV").or_else(|| std::env::var("NODE_ENV").ok()) {
            self.node_env = NodeEnv::parse(&v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_are_sane() {
        let config = ServiceConfig::default();
        assert!(config.max_inflight >= 4);
        assert_eq!(config.queue_limit, 100);
        assert_eq!(config.node_env, NodeEnv::Development);
    }

    #[test]
    fn env_overrides_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("PDF2IMG_MAX_INFLIGHT", "9");
        std::env::set_var("PDF2IMG_NODE_ENV", "production");
        let config = ServiceConfig::load(None).unwrap();
        assert_eq!(config.max_inflight, 9);
        assert_eq!(config.node_env, NodeEnv::Production);
        std::env::remove_var("PDF2IMG_MAX_INFLIGHT");
        std::env::remove_var("PDF2IMG_NODE_ENV");
    }

    #[test]
    fn bare_node_env_is_honored_without_prefix() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("NODE_ENV", "production");
        let config = ServiceConfig::load(None).unwrap();
        assert_eq!(config.node_env, NodeEnv::Production);
        std::env::remove_var("NODE_ENV");
    }

    #[test]
    fn prefixed_node_env_wins_over_bare() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("NODE_ENV", "production");
        std::env::set_var("PDF2IMG_NODE_ENV", "development");
        let config = ServiceConfig::load(None).unwrap();
        assert_eq!(config.node_env, NodeEnv::Development);
        std::env::remove_var("NODE_ENV");
        std::env::remove_var("PDF2IMG_NODE_ENV");
    }
}
