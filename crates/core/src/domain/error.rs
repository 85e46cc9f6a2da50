// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Construction-time misuse, e.g. a blink period of zero
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid signal task state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
