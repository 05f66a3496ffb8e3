//! Error types for configuration loading.
//!
//! This module defines all errors that can occur while reading `config.toml`
//! and parsing agents documents.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The agents document is malformed or lacks a sequence-typed `agents` field.
    ///
    /// Callers keep their previously loaded agent set when they see this.
    #[error("Invalid agents document: {reason}")]
    InvalidFormat { reason: String },

    /// An agents file on disk was rejected.
    #[error("Invalid agents file at {path}: {reason}")]
    InvalidAgentsFile { path: PathBuf, reason: String },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
