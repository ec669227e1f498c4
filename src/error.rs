use std::fmt;

/// Result type for polecart operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the trainer
#[derive(Debug, Clone, PartialEq)]
pub enum DqnError {
    /// Observation, batch or parameter shapes disagree
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// A sample was requested from a buffer holding fewer records
    InsufficientSamples {
        requested: usize,
        available: usize,
    },

    /// Action index outside the environment's action set
    InvalidAction {
        action: usize,
        num_actions: usize,
    },

    /// Loss or gradients became NaN or infinite
    NumericalError(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// Configuration could not be parsed or failed validation
    ConfigError(String),
}

impl fmt::Display for DqnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqnError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            DqnError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            DqnError::InsufficientSamples { requested, available } => {
                write!(f, "Cannot sample {} transitions from a buffer holding {}", requested, available)
            }
            DqnError::InvalidAction { action, num_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, num_actions)
            }
            DqnError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            DqnError::IoError(msg) => write!(f, "IO error: {}", msg),
            DqnError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            DqnError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for DqnError {}

impl From<std::io::Error> for DqnError {
    fn from(err: std::io::Error) -> Self {
        DqnError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for DqnError {
    fn from(err: bincode::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for DqnError {
    fn from(err: serde_json::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for DqnError {
    fn from(err: toml::de::Error) -> Self {
        DqnError::ConfigError(err.to_string())
    }
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_samples_display() {
        let err = DqnError::InsufficientSamples { requested: 10, available: 5 };
        assert_eq!(err.to_string(), "Cannot sample 10 transitions from a buffer holding 5");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DqnError = io.into();
        assert!(matches!(err, DqnError::IoError(_)));
    }
}
