// file: src/error.rs
// version: 1.0.0
// guid: 503c5cdd-bbaa-4703-9c7e-7b9fe94fad43

use thiserror::Error;

/// Result type alias for the wrapper
pub type Result<T> = std::result::Result<T, WrapperError>;

/// Error types for the bowtie2 wrapper
#[derive(Error, Debug)]
pub enum WrapperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command execution error: {0}")]
    Execution(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Security violation: {0}")]
    Security(String),

    #[error("Command `{command}` failed with exit code {exit_code:?}: {stderr}")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Bowtie failed: {output}")]
    AlignerFailed { command: String, output: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl WrapperError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a new tool not found error
    pub fn tool_not_found(msg: impl Into<String>) -> Self {
        Self::ToolNotFound(msg.into())
    }

    /// Create a new security error
    pub fn security(msg: impl Into<String>) -> Self {
        Self::Security(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// True when the failure came from bowtie2's own `(ERR):` report
    pub fn is_aligner_failure(&self) -> bool {
        matches!(self, Self::AlignerFailed { .. })
    }
}
