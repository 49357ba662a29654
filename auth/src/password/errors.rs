use thiserror::Error;

/// Error type for password hashing and verification.
///
/// A mismatched password is not an error; it is the `Ok(false)` case of
/// verification. These variants cover operational failures only.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
