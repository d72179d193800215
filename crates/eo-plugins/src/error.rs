//! Error types for the collection plugins.

use std::path::PathBuf;

use datacube::CubeError;
use native_parser::NativeError;
use thiserror::Error;

/// Errors raised by the family adapters.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Unknown {family} bands requested: {unknown:?}. Allowed: {allowed:?}")]
    UnknownBands {
        family: &'static str,
        unknown: Vec<String>,
        allowed: Vec<String>,
    },

    #[error(
        "{family} band selection mixes incompatible grids. \
         Load either bands={first:?} or bands={second:?}"
    )]
    IncompatibleBandGroups {
        family: &'static str,
        first: Vec<String>,
        second: Vec<String>,
    },

    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a directory, expected a .SEN3 SAFE folder", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} is neither a .nat file nor a directory with exactly one .nat file", .0.display())]
    NotANativeFile(PathBuf),

    #[error("no supported OLCI files found in {}", .0.display())]
    NoSupportedFiles(PathBuf),

    #[error("No reader named '{0}' is available")]
    ReaderUnavailable(String),

    #[error("Reader '{reader}' failed")]
    Reader {
        reader: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Reader '{reader}' did not provide variable '{variable}'")]
    MissingVariable { reader: String, variable: String },

    #[error("Invalid band profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Cube(#[from] CubeError),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
