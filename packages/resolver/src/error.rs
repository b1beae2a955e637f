//! Errors for the fallible edges of the resolver.
//!
//! Resolution itself never fails: a specifier that cannot be resolved is a
//! [`Resolution`](crate::Resolution) outcome, not an error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid alias filter `{pattern}`: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("packagesDir must be a single directory name, got `{0}`")]
    InvalidPackagesDir(String),

    #[error("extensions must not be empty")]
    NoExtensions,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Invalid source pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}
