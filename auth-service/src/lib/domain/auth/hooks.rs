use std::sync::Arc;

use auth::AttemptTracker;

use crate::domain::auth::models::ClientKey;

/// Handlers for authentication outcomes.
///
/// The login flow publishes exactly one outcome per attempt, carrying the
/// same `ClientKey` the gate was checked under, so the increment and check
/// paths can never be keyed differently.
pub struct AttemptHooks {
    tracker: Arc<AttemptTracker>,
}

impl AttemptHooks {
    pub fn new(tracker: Arc<AttemptTracker>) -> Self {
        Self { tracker }
    }

    /// Count a failed login against the client.
    pub fn handle_failure(&self, client_key: &ClientKey) {
        let failures = self.tracker.record_failure(client_key.as_str());

        if failures >= self.tracker.max_failures() {
            tracing::warn!(
                client = %client_key,
                failures,
                "Client temporarily locked out"
            );
        } else {
            tracing::debug!(client = %client_key, failures, "Login failure recorded");
        }
    }

    /// Clear the failure count after a successful login.
    pub fn handle_success(&self, client_key: &ClientKey) {
        self.tracker.record_success(client_key.as_str());
        tracing::debug!(client = %client_key, "Login failure count cleared");
    }
}
