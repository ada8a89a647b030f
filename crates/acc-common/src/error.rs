//! Error types for the ACC system
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using AccError
pub type Result<T> = std::result::Result<T, AccError>;

/// Unified error type for ACC operations
#[derive(Debug, Error)]
pub enum AccError {
    // Schema and argument validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // Referenced entity (session) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    // External model failures
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    // Evaluation harness errors
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AccError {
    /// Shorthand for an invalid constructor argument
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AccError::Validation(ValidationError::InvalidArgument(message.into()))
    }
}

/// Malformed CCS payloads and invalid arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("CCS payload is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{field} must be a string")]
    NotAString { field: String },

    #[error("{field} must not be blank")]
    BlankString { field: String },

    #[error("{field} must be an array of strings")]
    NotAStringArray { field: String },

    #[error("{field}[{index}] must be a string")]
    NonStringItem { field: String, index: usize },

    #[error("{field}[{index}] must not be blank")]
    BlankItem { field: String, index: usize },

    #[error("{field} list limit must be at least 1, got {limit}")]
    InvalidLimit { field: String, limit: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures calling the external model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Credentials or model settings are wrong; retrying will not help
    #[error("Model configuration error: {0}")]
    Configuration(String),

    /// Network or provider failure; the turn may be retried later
    #[error("Model transport error: {0}")]
    Transport(String),

    /// The model answered but violated the expected response shape
    #[error("Model response format error: {0}")]
    ResponseFormat(String),
}

impl UpstreamError {
    /// Whether retrying the whole turn could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, UpstreamError::Transport(_))
    }
}

/// Evaluation harness errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("At least one evaluation record is required")]
    EmptyRecords,

    #[error("Agent name must not be blank")]
    BlankAgentName,

    #[error("At least one agent runner is required")]
    NoAgentRunners,

    #[error("At least one evaluation query is required")]
    NoQueries,

    #[error("Judge evaluated agent names do not match runners: missing={missing:?}, unexpected={unexpected:?}")]
    AgentNameMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

impl From<serde_json::Error> for AccError {
    fn from(err: serde_json::Error) -> Self {
        AccError::Serialization(err.to_string())
    }
}
