use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0} (accepted values: ADMIN, PREMIUM, FREE)")]
    Unknown(String),
}

/// Top-level error for authentication operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    /// The login origin is locked out. Carries the wait before the lock
    /// expires; retryable after that.
    #[error("Too many failed login attempts, retry in {remaining_seconds} seconds")]
    TemporarilyLocked { remaining_seconds: u64 },

    /// Kept distinct from `InvalidCredentials` inside the domain; the HTTP
    /// layer masks the difference in user-facing responses.
    #[error("No user found with username: {0}")]
    IdentityNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    // Infrastructure errors
    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
