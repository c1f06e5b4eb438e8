//! Error handling module for the features guard
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Registry failures are never caught inside the engine: they travel back to the
//! host through these types so the host can abort its activation transaction.

use thiserror::Error;

/// Main error type for the features guard
#[derive(Error, Debug)]
pub enum GuardError {
    /// Dependency rules are present but malformed or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A dependent module transitively lists itself as a trigger
    #[error("Dependency cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// Activation registry or descriptor snapshot could not be read or written
    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Lifecycle propagation did not settle
    #[error("Propagation error: {0}")]
    Propagation(String),

    /// IO errors (reading configuration files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for features guard operations
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::RegistryUnavailable(msg.into())
    }

    /// Create a propagation error
    pub fn propagation(msg: impl Into<String>) -> Self {
        Self::Propagation(msg.into())
    }

    /// Returns true if the failure came from the registry side rather than configuration
    pub fn is_registry(&self) -> bool {
        matches!(self, Self::RegistryUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GuardError::config("trigger list must be an array");
        assert_eq!(
            err.to_string(),
            "Configuration error: trigger list must be an array"
        );

        let err = GuardError::registry("store offline");
        assert_eq!(err.to_string(), "Registry unavailable: store offline");
    }

    #[test]
    fn test_cycle_display_joins_path() {
        let err = GuardError::Cycle {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Dependency cycle detected: A -> B -> A");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GuardError = io_err.into();
        assert!(matches!(err, GuardError::Io(_)));
        assert!(!err.is_registry());
    }

    #[test]
    fn test_is_registry() {
        assert!(GuardError::registry("x").is_registry());
        assert!(!GuardError::propagation("x").is_registry());
    }
}
