//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors. These are the only startup-fatal
/// conditions besides I/O; everything else recovers with a fallback
/// and goes through the [`crate::report::Reporter`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("type table has no `default` entry")]
    MissingDefault,
}
