//! Error types for the sandbox
//!
//! Simulation itself never fails; errors come from configuration, sensor
//! registration and graphics setup.

use thiserror::Error;

use crate::sim::GravitySource;

/// Sandbox error types
#[derive(Error, Debug)]
pub enum SandboxError {
    /// Settings JSON could not be parsed
    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// Settings file could not be read
    #[error("Failed to read settings from {path}: {source}")]
    SettingsIo {
        /// File path that was read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Preset name did not match any known preset
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    /// The platform offers no sensor for this gravity source
    #[error("{kind:?} sensor is not available on this platform")]
    SensorUnavailable {
        /// Requested gravity source
        kind: GravitySource,
    },

    /// Registering or removing a sensor listener failed
    #[error("Sensor listener error: {0}")]
    SensorListener(String),

    /// GPU adapter, device or surface setup failed
    #[error("Graphics initialisation failed: {0}")]
    Graphics(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SandboxError>;
