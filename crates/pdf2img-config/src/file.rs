use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Optional overlay loaded from `--config <file>` (spec.md §1A). Every
/// field is optional: only the settings an operator chooses to pin in a
/// file are present, and absent fields simply leave the environment's (or
/// built-in) value untouched by [`crate::ServiceConfig::load`]'s merge
/// step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub max_inflight: Option<usize>,
    pub queue_limit: Option<usize>,
    pub cpu_threshold: Option<f32>,
    pub memory_threshold: Option<f32>,
    pub output_dir: Option<String>,
    pub node_env: Option<String>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FileConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| FileConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&raw).map_err(|e| FileConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_overlay() {
        let toml = "max_inflight = 8\nnode_env = \"production\"\n";
        let parsed: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(parsed.max_inflight, Some(8));
        assert_eq!(parsed.node_env.as_deref(), Some("production"));
        assert_eq!(parsed.queue_limit, None);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = FileConfig::load("/nonexistent/pdf2img.toml").unwrap_err();
        assert!(matches!(err, FileConfigError::Io { .. }));
    }
}
