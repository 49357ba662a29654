use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use auth::AttemptTracker;
use auth::LockoutPolicy;
use auth::TokenCodec;
use auth_service::domain::auth::errors::AuthError;
use auth_service::domain::auth::models::User;
use auth_service::domain::auth::ports::UserRepository;
use auth_service::domain::auth::service::AuthService;
use auth_service::inbound::http::router::create_router;

pub const TEST_JWT_SECRET: &[u8] = b"integration_test_secret_32_bytes!!";

/// Account store for tests, keyed by username.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(user.username.as_str()) {
            return Err(AuthError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        users.insert(user.username.as_str().to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().unwrap().get(username).cloned())
    }
}

/// Test application running the real router on a random port.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application with the production lockout policy.
    pub async fn spawn() -> Self {
        Self::spawn_with_policy(LockoutPolicy::default()).await
    }

    /// Spawn the application with a custom lockout policy (tests that need
    /// a lock to expire within the test run shorten `lock_duration`).
    pub async fn spawn_with_policy(policy: LockoutPolicy) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());
        let token_codec = TokenCodec::new(TEST_JWT_SECRET);
        let tracker = Arc::new(AttemptTracker::new(policy));
        let auth_service = Arc::new(AuthService::new(repository, token_codec, tracker));

        let router = create_router(auth_service);
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server crashed");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Register an account, expecting success.
    pub async fn register(&self, username: &str, password: &str, role: &str) {
        let response = self
            .post("/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
                "role": role,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    /// Log in, expecting success, and return the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/auth/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("Response carried no token")
            .to_string()
    }
}
