use thiserror::Error;

/// Common error types for the flow engine
///
/// Every variant carries a human-readable message only. Callers branch on "did it fail" and display the text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Bad option type, out-of-range value, invalid identifier or reserved option name
    #[error("{0}")]
    Configuration(String),

    /// Composite shape check failures, empty child lists, missing upstream producers
    #[error("{0}")]
    Structural(String),

    /// Callable actor references that could not be resolved
    #[error("{0}")]
    Resolution(String),

    /// Failures and caught faults during execution
    #[error("{0}")]
    Execution(String),

    /// Serialization/deserialization errors
    #[error("{0}")]
    Serialization(String),

    /// File system related errors
    #[error("{0}")]
    FileSystem(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String)
}

impl FlowError {
    /// The message text of the error
    pub fn message(&self) -> &str {
        match self {
            FlowError::Configuration(msg)
            | FlowError::Structural(msg)
            | FlowError::Resolution(msg)
            | FlowError::Execution(msg)
            | FlowError::Serialization(msg)
            | FlowError::FileSystem(msg)
            | FlowError::Generic(msg) => msg
        }
    }

    /// Prefixes the message with the full name of the actor that raised it, keeping the variant
    pub fn in_actor(self, full_name: &str) -> Self {
        let prefix = |msg: String| {
            if msg.starts_with(full_name) { msg } else { format!("{}: {}", full_name, msg) }
        };

        match self {
            FlowError::Configuration(msg) => FlowError::Configuration(prefix(msg)),
            FlowError::Structural(msg) => FlowError::Structural(prefix(msg)),
            FlowError::Resolution(msg) => FlowError::Resolution(prefix(msg)),
            FlowError::Execution(msg) => FlowError::Execution(prefix(msg)),
            FlowError::Serialization(msg) => FlowError::Serialization(prefix(msg)),
            FlowError::FileSystem(msg) => FlowError::FileSystem(prefix(msg)),
            FlowError::Generic(msg) => FlowError::Generic(prefix(msg))
        }
    }
}

/// Convert from anyhow::Error
impl From<anyhow::Error> for FlowError {
    fn from(err: anyhow::Error) -> Self {
        FlowError::Generic(err.to_string())
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::FileSystem(err.to_string())
    }
}

/// Convert from serde_yaml::Error
impl From<serde_yaml::Error> for FlowError {
    fn from(err: serde_yaml::Error) -> Self {
        FlowError::Serialization(err.to_string())
    }
}

/// Convert from serde_json::Error
impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Serialization(err.to_string())
    }
}
