//! Core error types for mindguard-core.
//!
//! Nothing in this crate performs I/O that can transiently fail apart from
//! reading and writing the config file, so the hierarchy is small: scheduler
//! state-consistency errors, configuration errors, and a wrapper for both.

use std::path::PathBuf;
use thiserror::Error;

use crate::scheduler::BreakId;

/// Core error type for mindguard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Scheduler state errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors raised by [`crate::NotificationScheduler`] operations.
///
/// None of these are fatal. Callers driving the scheduler from user input
/// can log and carry on; timer dispatch already does so.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// An action was requested from a state that does not allow it,
    /// e.g. accepting an intervention while nothing is showing.
    #[error("Cannot {action} while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: &'static str,
    },

    /// The break id does not name a suggestion this scheduler created.
    #[error("Unknown break id: {0}")]
    UnknownBreakId(BreakId),

    /// A fired timer handle that the scheduler no longer (or never) owned.
    #[error("Unknown notification timer: {0}")]
    UnknownNotificationId(u64),

    /// The scheduler was shut down and no longer arms timers.
    #[error("Scheduler has been shut down")]
    ShutDown,

    /// A catalog the scheduler draws from has no entries.
    #[error("Catalog '{0}' is empty")]
    EmptyCatalog(&'static str),

    /// Scheduler options failed validation.
    #[error("Invalid scheduler configuration: {0}")]
    InvalidConfig(String),

    /// A zero-length interval would make a periodic timer spin.
    #[error("Interval '{0}' must be greater than zero")]
    ZeroInterval(&'static str),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
