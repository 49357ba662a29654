use std::sync::Arc;

use async_trait::async_trait;
use auth::AttemptTracker;
use auth::PasswordHasher;
use auth::TokenCodec;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::hooks::AttemptHooks;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::ClientKey;
use crate::domain::auth::models::RegisterUserCommand;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::UserRepository;

/// Authentication domain service.
///
/// Owns the gate ordering: for every login attempt the lockout check
/// happens before the credential lookup, which happens before the password
/// comparison. A locked client can therefore never trigger a password
/// comparison.
pub struct AuthService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    token_codec: TokenCodec,
    tracker: Arc<AttemptTracker>,
    hooks: AttemptHooks,
    password_hasher: PasswordHasher,
}

impl<R> AuthService<R>
where
    R: UserRepository,
{
    /// Create the service with injected collaborators.
    ///
    /// The tracker is shared with the attempt hooks so the check and
    /// increment paths observe one state.
    pub fn new(repository: Arc<R>, token_codec: TokenCodec, tracker: Arc<AttemptTracker>) -> Self {
        let hooks = AttemptHooks::new(Arc::clone(&tracker));
        Self {
            repository,
            token_codec,
            tracker,
            hooks,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Gate a credential lookup behind the lockout state.
    ///
    /// # Errors
    /// * `TemporarilyLocked` - the client is locked; the repository is
    ///   never touched in this case
    /// * `IdentityNotFound` - no account with this username
    /// * `DatabaseError` - lookup failed
    pub async fn prepare_lookup(
        &self,
        client_key: &ClientKey,
        username: &str,
    ) -> Result<User, AuthError> {
        if self.tracker.is_locked(client_key.as_str()) {
            return Err(AuthError::TemporarilyLocked {
                remaining_seconds: self.tracker.remaining_seconds(client_key.as_str()),
            });
        }

        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::IdentityNotFound(username.to_string()))
    }
}

#[async_trait]
impl<R> AuthServicePort for AuthService<R>
where
    R: UserRepository,
{
    async fn login(
        &self,
        client_key: &ClientKey,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let user = match self.prepare_lookup(client_key, username).await {
            Ok(user) => user,
            Err(AuthError::IdentityNotFound(name)) => {
                // Unknown usernames count toward lockout too, or an
                // attacker could enumerate accounts without penalty.
                self.hooks.handle_failure(client_key);
                return Err(AuthError::IdentityNotFound(name));
            }
            Err(e) => return Err(e),
        };

        if self
            .password_hasher
            .verify(password, &user.password_hash)?
        {
            self.hooks.handle_success(client_key);
            let roles = vec![user.role.as_str().to_string()];
            Ok(self.token_codec.issue(user.username.as_str(), &roles)?)
        } else {
            self.hooks.handle_failure(client_key);
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn register(&self, command: RegisterUserCommand) -> Result<User, AuthError> {
        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            password_hash,
            role: command.role,
            created_at: Utc::now(),
        };

        self.repository.create(user).await
    }

    async fn authenticate_token(&self, token: &str) -> Option<AuthenticatedUser> {
        let subject = match self.token_codec.verify(token) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::warn!("Bearer token rejected: {}", e);
                return None;
            }
        };

        // A token may outlive its account; a cryptographically valid token
        // for a missing identity authenticates nothing.
        match self.repository.find_by_username(&subject).await {
            Ok(Some(user)) => Some(AuthenticatedUser {
                user_id: user.id,
                username: user.username.to_string(),
                role: user.role,
            }),
            Ok(None) => {
                tracing::warn!(subject = %subject, "Valid token for a missing identity");
                None
            }
            Err(e) => {
                tracing::error!("User lookup failed during token authentication: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use auth::LockoutPolicy;
    use mockall::mock;

    use super::*;
    use crate::domain::auth::models::UserRole;
    use crate::domain::auth::models::Username;

    const TEST_SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, AuthError>;
            async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
        }
    }

    fn service(repository: MockTestUserRepository) -> AuthService<MockTestUserRepository> {
        AuthService::new(
            Arc::new(repository),
            TokenCodec::new(TEST_SECRET),
            Arc::new(AttemptTracker::new(LockoutPolicy::default())),
        )
    }

    fn user_with_password(username: &str, password: &str, role: UserRole) -> User {
        let password_hash = PasswordHasher::new()
            .hash(password)
            .expect("Failed to hash password");
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_login_success_issues_verifiable_token() {
        let mut repository = MockTestUserRepository::new();
        let stored = user_with_password("alice", "password123", UserRole::Admin);

        repository
            .expect_find_by_username()
            .withf(|username| username == "alice")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service(repository);
        let client = ClientKey::new("10.0.0.5");

        let token = service
            .login(&client, "alice", "password123")
            .await
            .expect("Login failed");

        let subject = TokenCodec::new(TEST_SECRET)
            .verify(&token)
            .expect("Issued token did not verify");
        assert_eq!(subject, "alice");
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails_with_masked_distinction() {
        let mut repository = MockTestUserRepository::new();
        let stored = user_with_password("alice", "password123", UserRole::Free);

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service(repository);
        let client = ClientKey::new("10.0.0.5");

        let result = service.login(&client, "alice", "wrong_password").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user_fails_and_counts_toward_lockout() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(3)
            .returning(|_| Ok(None));

        let service = service(repository);
        let client = ClientKey::new("10.0.0.5");

        for _ in 0..3 {
            let result = service.login(&client, "ghost", "whatever").await;
            assert!(matches!(result, Err(AuthError::IdentityNotFound(_))));
        }

        // The fourth attempt is locked out before the repository is
        // consulted (expect_find_by_username is capped at 3 calls).
        let result = service.login(&client, "ghost", "whatever").await;
        assert!(matches!(
            result,
            Err(AuthError::TemporarilyLocked { remaining_seconds } ) if remaining_seconds > 0
        ));
    }

    #[tokio::test]
    async fn test_three_failures_lock_out_even_the_correct_password() {
        let mut repository = MockTestUserRepository::new();
        let stored = user_with_password("alice", "password123", UserRole::Free);

        repository
            .expect_find_by_username()
            .times(3)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service(repository);
        let client = ClientKey::new("10.0.0.5");

        for _ in 0..3 {
            let result = service.login(&client, "alice", "wrong_password").await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        // Correct credentials, but the gate refuses before any password
        // comparison or lookup can happen.
        let result = service.login(&client, "alice", "password123").await;
        assert!(matches!(
            result,
            Err(AuthError::TemporarilyLocked { remaining_seconds }) if remaining_seconds > 0
        ));
    }

    #[tokio::test]
    async fn test_success_resets_the_failure_count() {
        let mut repository = MockTestUserRepository::new();
        let stored = user_with_password("alice", "password123", UserRole::Free);

        repository
            .expect_find_by_username()
            .times(5)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service(repository);
        let client = ClientKey::new("10.0.0.5");

        service.login(&client, "alice", "nope").await.unwrap_err();
        service.login(&client, "alice", "nope").await.unwrap_err();
        service
            .login(&client, "alice", "password123")
            .await
            .expect("Login failed");

        // Two more failures start from zero; no lock yet.
        service.login(&client, "alice", "nope").await.unwrap_err();
        let result = service.login(&client, "alice", "nope").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_lockout_is_per_client_key() {
        let mut repository = MockTestUserRepository::new();
        let stored = user_with_password("alice", "password123", UserRole::Free);

        repository
            .expect_find_by_username()
            .times(4)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service(repository);
        let locked = ClientKey::new("10.0.0.5");
        let other = ClientKey::new("10.0.0.6");

        for _ in 0..3 {
            service.login(&locked, "alice", "nope").await.unwrap_err();
        }

        assert!(matches!(
            service.login(&locked, "alice", "password123").await,
            Err(AuthError::TemporarilyLocked { .. })
        ));
        assert!(service.login(&other, "alice", "password123").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_stores_a_hashed_password() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "alice"
                    && user.role == UserRole::Premium
                    && user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(Ok);

        let service = service(repository);

        let command = RegisterUserCommand::new(
            Username::new("alice".to_string()).unwrap(),
            "password123".to_string(),
            UserRole::Premium,
        );

        let user = service.register(command).await.expect("Register failed");
        assert_eq!(user.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_register_duplicate_username_propagates() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_create().times(1).returning(|user| {
            Err(AuthError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ))
        });

        let service = service(repository);

        let command = RegisterUserCommand::new(
            Username::new("alice".to_string()).unwrap(),
            "password123".to_string(),
            UserRole::Free,
        );

        let result = service.register(command).await;
        assert!(matches!(
            result,
            Err(AuthError::UsernameAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_token_attaches_the_stored_role() {
        let mut repository = MockTestUserRepository::new();
        let stored = user_with_password("alice", "password123", UserRole::Admin);
        let stored_id = stored.id;

        repository
            .expect_find_by_username()
            .withf(|username| username == "alice")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service(repository);

        let token = TokenCodec::new(TEST_SECRET)
            .issue("alice", &["ADMIN".to_string()])
            .expect("Failed to issue token");

        let principal = service
            .authenticate_token(&token)
            .await
            .expect("Expected a principal");
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.role, UserRole::Admin);
        assert_eq!(principal.user_id, stored_id);
    }

    #[tokio::test]
    async fn test_authenticate_token_rejects_missing_identity() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository);

        // Cryptographically valid, but the subject no longer exists.
        let token = TokenCodec::new(TEST_SECRET)
            .issue("deleted_user", &[])
            .expect("Failed to issue token");

        assert!(service.authenticate_token(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_token_rejects_garbage_without_lookup() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);

        let service = service(repository);

        assert!(service.authenticate_token("not.a.token").await.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_token_rejects_tampered_signature() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);

        let service = service(repository);

        let mut token = TokenCodec::new(TEST_SECRET)
            .issue("alice", &[])
            .expect("Failed to issue token");
        let flipped = if token.ends_with('A') { 'B' } else { 'A' };
        token.pop();
        token.push(flipped);

        assert!(service.authenticate_token(&token).await.is_none());
    }
}
