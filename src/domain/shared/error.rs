//! Domain errors

use thiserror::Error;

/// Domain result type
pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Reasoning backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Malformed backend output: {0}")]
    MalformedBackendOutput(String),

    #[error("Transport fault: {0}")]
    TransportFault(String),

    #[error("Lead store failure: {0}")]
    Store(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
