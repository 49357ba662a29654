use thiserror::Error;

/// Error type for token operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TokenError {
    /// Issuance could not produce a valid signature. This is a
    /// configuration error and must not be swallowed by callers.
    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token issuer is not accepted")]
    InvalidIssuer,

    #[error("Token is invalid: {0}")]
    Invalid(String),
}
