use thiserror::Error;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The caller did not present a valid credential.
    #[error("unauthorized")]
    Unauthorized,
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Submitted input failed validation.
    #[error("invalid input: {0}")]
    Form(String),
    /// A value violated a domain constraint.
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// The operation is already running.
    #[error("conflict: {0}")]
    Conflict(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
