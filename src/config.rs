use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::producer::EmitMode;

/// Pipeline settings, usually read from TOML.
///
/// ```toml
/// name = "ingest"
/// capacity = 16
/// timeout_ms = 5000
/// emit_mode = "blocking"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Prefix for worker thread names.
    pub name: String,
    /// Channel capacity; 0 is a rendezvous channel.
    pub capacity: usize,
    /// Cancel automatically after this many milliseconds. Zero or negative
    /// cancels immediately.
    pub timeout_ms: Option<i64>,
    pub emit_mode: EmitMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            name: "pipeline".to_string(),
            capacity: 0,
            timeout_ms: None,
            emit_mode: EmitMode::Blocking,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "name",
                &self.name,
                "must not be empty",
            ));
        }
        if self.name.contains('\0') {
            return Err(ConfigError::invalid_value(
                "name",
                self.name.escape_debug().to_string(),
                "must not contain NUL bytes",
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms
            .map(|ms| Duration::from_millis(u64::try_from(ms).unwrap_or(0)))
    }
}
