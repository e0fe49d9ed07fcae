//! Error taxonomy for configuration, device setup and the event stream.

use std::io;

use thiserror::Error;

/// Rejected configuration values. Always reported before any device is opened.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be between 0 and 100, got {value}")]
    PercentOutOfRange { name: &'static str, value: i32 },

    #[error("{name} must be greater than 0")]
    EmptyArea { name: &'static str },

    #[error("{offset} + {extent} must not exceed 100 (got {sum})")]
    AreaOverflow {
        offset: &'static str,
        extent: &'static str,
        sum: i32,
    },

    #[error("area collapses on the {axis} axis (source range {range} too small)")]
    CollapsedArea { axis: char, range: i32 },

    #[error("expected left,top,width,height, got '{0}'")]
    AreaSyntax(String),

    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f64),

    #[error("batch capacity must be at least 1")]
    InvalidCapacity,

    #[error("cannot read config file {path}: {message}")]
    FileRead { path: String, message: String },

    #[error("invalid config file {path}: {message}")]
    FileParse { path: String, message: String },

    #[error("no touchscreen given (pass a device path or set `device` in the config file)")]
    MissingDevice,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("device setup failed ({step}): {source}")]
    DeviceSetup {
        step: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("touchscreen stream ended: {0}")]
    SourceRead(#[source] io::Error),

    #[error("sink write failed: {0}")]
    SinkWrite(#[source] io::Error),
}

impl Error {
    /// Build a `map_err` adapter tagging an io error with the setup step that failed.
    pub fn setup(step: &'static str) -> impl FnOnce(io::Error) -> Error {
        move |source| Error::DeviceSetup { step, source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
