//! Domain errors

use thiserror::Error;

/// Domain result type
pub type Result<T> = std::result::Result<T, VoiceError>;

#[derive(Error, Debug, Clone)]
pub enum VoiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}
