use chrono::DateTime;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Issuer embedded in every token this service signs and the only issuer
/// accepted at verification time.
pub const TOKEN_ISSUER: &str = "OWASP-api";

/// Token lifetime in hours.
const TOKEN_TTL_HOURS: i64 = 2;

/// Expiration arithmetic runs in this fixed offset regardless of the host
/// timezone. Changing it silently changes token lifetime semantics for
/// already-deployed verifiers.
const ISSUE_OFFSET_SECONDS: i32 = -3 * 3600;

/// Claim set carried by a bearer token.
///
/// Tokens are self-contained: once signed there is no server-side record,
/// and validity is recomputed from these claims on every verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Subject (username of the authenticated identity)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Role names granted to the subject, in grant order
    pub roles: Vec<String>,
}

impl Claims {
    /// Create the claim set for a freshly authenticated subject.
    ///
    /// Expiration is two hours from now, computed in the fixed -03:00
    /// offset.
    pub fn for_subject(subject: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            iss: TOKEN_ISSUER.to_string(),
            sub: subject.into(),
            exp: expiration_timestamp(Utc::now()),
            roles,
        }
    }

    /// Set the expiration timestamp.
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Set the issuer.
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = iss.into();
        self
    }
}

fn expiration_timestamp(now: DateTime<Utc>) -> i64 {
    let offset =
        FixedOffset::east_opt(ISSUE_OFFSET_SECONDS).expect("-03:00 is a valid UTC offset");
    (now.with_timezone(&offset) + Duration::hours(TOKEN_TTL_HOURS)).timestamp()
}
