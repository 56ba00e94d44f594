//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent compensation-plan rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
