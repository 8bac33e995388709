//! Error types and handling for shieldgate

use thiserror::Error;

/// Result type alias for shieldgate operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Main error type for the access-control layer
#[derive(Error, Debug)]
pub enum GuardError {
    /// Configuration errors (load time only)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Failures reported by the firewall engine collaborator
    #[error("Firewall engine error: {operation}: {message}")]
    Engine { operation: String, message: String },

    /// Failures reported by the settings/state store
    #[error("Settings store error: {message}")]
    Store { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GuardError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an engine error for the named engine operation
    pub fn engine<O: Into<String>, S: Into<String>>(operation: O, message: S) -> Self {
        Self::Engine {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Whether the error came from one of the external collaborators
    /// (engine or store) rather than from this layer's own input handling.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            GuardError::Engine { .. } | GuardError::Store { .. } | GuardError::Io(_)
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            GuardError::Config { .. } => "config",
            GuardError::Engine { .. } => "engine",
            GuardError::Store { .. } => "store",
            GuardError::Io(_) => "io",
            GuardError::Serde(_) => "serialization",
            GuardError::Yaml(_) => "yaml",
            GuardError::Internal(_) => "internal",
        }
    }
}
