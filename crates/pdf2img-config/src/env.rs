//! Typed environment-variable loading, adapted from
//! `riptide-config::env::EnvConfigLoader` — prefix support, a
//! `require`/`default` builder, and typed `get_*` accessors.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment variable not found: {var}")]
    NotFound { var: String },
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
    #[error("type conversion error for {var}: {reason}")]
    ConversionError { var: String, reason: String },
}

pub struct EnvConfigLoader {
    prefix: Option<String>,
    required: Vec<String>,
    defaults: HashMap<String, String>,
}

impl EnvConfigLoader {
    pub fn new() -> Self {
        Self {
            prefix: None,
            required: Vec::new(),
            defaults: HashMap::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn require(mut self, var: impl Into<String>) -> Self {
        self.required.push(var.into());
        self
    }

    pub fn default(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(var.into(), value.into());
        self
    }

    pub fn get(&self, var: &str) -> Result<String, EnvError> {
        let full_var = self.make_var_name(var);
        env::var(&full_var).or_else(|_| {
            self.defaults
                .get(var)
                .cloned()
                .ok_or_else(|| EnvError::NotFound { var: full_var.clone() })
        })
    }

    pub fn get_optional(&self, var: &str) -> Option<String> {
        let full_var = self.make_var_name(var);
        env::var(&full_var).ok().or_else(|| self.defaults.get(var).cloned())
    }

    pub fn get_int(&self, var: &str) -> Result<i64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::ConversionError {
            var: self.make_var_name(var),
            reason: format!("cannot parse as integer: {e}"),
        })
    }

    pub fn get_uint(&self, var: &str) -> Result<u64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::ConversionError {
            var: self.make_var_name(var),
            reason: format!("cannot parse as unsigned integer: {e}"),
        })
    }

    pub fn get_float(&self, var: &str) -> Result<f64, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|e| EnvError::ConversionError {
            var: self.make_var_name(var),
            reason: format!("cannot parse as float: {e}"),
        })
    }

    pub fn get_bool(&self, var: &str) -> Result<bool, EnvError> {
        let value = self.get(var)?;
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(EnvError::InvalidValue {
                var: self.make_var_name(var),
                reason: format!("invalid boolean value: {value}"),
            }),
        }
    }

    /// Checks that every variable named via `require` is present (env or
    /// default), without yet parsing any of them.
    pub fn validate(&self) -> Result<(), EnvError> {
        for var in &self.required {
            self.get(var)?;
        }
        Ok(())
    }

    fn make_var_name(&self, var: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", var.to_uppercase()),
            None => var.to_uppercase(),
        }
    }
}

impl Default for EnvConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize these tests so
    // they don't clobber each other's set/remove calls.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn get_int_parses_prefixed_variable() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("PDF2IMG_TEST_MAX", "7");
        let loader = EnvConfigLoader::new().with_prefix("PDF2IMG_");
        assert_eq!(loader.get_int("TEST_MAX").unwrap(), 7);
        env::remove_var("PDF2IMG_TEST_MAX");
    }

    #[test]
    fn falls_back_to_default_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        let loader = EnvConfigLoader::new()
            .with_prefix("PDF2IMG_")
            .default("timeout", "60");
        assert_eq!(loader.get_int("timeout").unwrap(), 60);
    }

    #[test]
    fn missing_required_variable_is_not_found() {
        let _guard = ENV_LOCK.lock().unwrap();
        let loader = EnvConfigLoader::new().with_prefix("PDF2IMG_").require("MISSING_X");
        assert!(loader.get("MISSING_X").is_err());
    }
}
