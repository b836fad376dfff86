use std::io;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Configuration errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for field '{field}' ({value}): {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Pipeline errors
// =============================================================================

/// Errors surfaced when starting producers or mergers.
///
/// Closing a channel twice or writing to a closed channel cannot be expressed
/// with this crate's types, so neither shows up here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to spawn worker thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid worker name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub fn spawn(name: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            name: name.into(),
            source,
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let error = ConfigError::invalid_value("name", "", "must not be empty");
        let display = format!("{}", error);
        assert!(display.contains("'name'"));
        assert!(display.contains("must not be empty"));
    }

    #[test]
    fn test_spawn_error_keeps_source() {
        use std::error::Error as _;

        let error = PipelineError::spawn(
            "producer-0",
            io::Error::new(io::ErrorKind::OutOfMemory, "no threads left"),
        );
        assert!(error.to_string().contains("producer-0"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_config_error_converts_into_pipeline_error() {
        let error: PipelineError = ConfigError::invalid_value("capacity", "x", "bad").into();
        assert!(matches!(error, PipelineError::Config(ConfigError::InvalidValue { .. })));
    }
}
