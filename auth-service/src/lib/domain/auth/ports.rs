use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::ClientKey;
use crate::domain::auth::models::RegisterUserCommand;
use crate::domain::auth::models::User;

/// Port for the authentication domain service.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Authenticate a username/password pair for the client at
    /// `client_key` and issue a bearer token.
    ///
    /// The lockout check happens before the credential lookup, which
    /// happens before the password comparison; a locked client never
    /// reaches the comparison.
    ///
    /// # Errors
    /// * `TemporarilyLocked` - the client is locked out; carries remaining seconds
    /// * `IdentityNotFound` - no account with this username
    /// * `InvalidCredentials` - password does not match
    /// * `Token` - token issuance failed (configuration error)
    /// * `DatabaseError` - lookup failed
    async fn login(
        &self,
        client_key: &ClientKey,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError>;

    /// Create a new account, hashing the password before storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - the username is taken
    /// * `Password` - hashing failed
    /// * `DatabaseError` - persistence failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError>;

    /// Resolve a bearer token into a request principal.
    ///
    /// Absorbs every failure (bad signature, expired, unknown subject)
    /// into `None` after logging; the request proceeds unauthenticated.
    async fn authenticate_token(&self, token: &str) -> Option<AuthenticatedUser>;
}

/// Lookup and persistence for user accounts.
///
/// Supplied by the storage adapter; the domain only ever reaches accounts
/// through this port.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - the username is taken
    /// * `DatabaseError` - persistence failed
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve an account by username.
    ///
    /// # Returns
    /// `None` if no such account exists.
    ///
    /// # Errors
    /// * `DatabaseError` - lookup failed
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
}
