use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TOKEN_ISSUER;
use super::errors::TokenError;

/// Issues and verifies the service's signed bearer tokens.
///
/// Tokens are stateless: validity is a function of signature and expiration
/// alone, so verification needs no shared state and scales horizontally.
/// The accepted cost is that an issued token cannot be revoked before it
/// expires.
///
/// Uses HS256 (HMAC with SHA-256) with a shared secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec from the shared signing secret.
    ///
    /// The secret should be at least 256 bits for HS256 and must be the
    /// same on every node that verifies tokens; rotating it invalidates
    /// all previously issued tokens.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Issue a signed token for `subject` carrying `roles`.
    ///
    /// # Errors
    /// * `SigningFailed` - the configured secret could not produce a
    ///   signature; callers must treat this as a hard error, never as an
    ///   empty token
    pub fn issue(&self, subject: &str, roles: &[String]) -> Result<String, TokenError> {
        self.encode(&Claims::for_subject(subject, roles.to_vec()))
    }

    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Check signature, issuer, and expiration, returning the subject.
    ///
    /// Every failure is a recoverable error value; the request pipeline
    /// degrades to an unauthenticated request instead of aborting.
    ///
    /// # Errors
    /// * `Expired` - the expiration instant has passed (no leeway)
    /// * `InvalidIssuer` - the issuer claim is not ours
    /// * `Invalid` - bad signature or malformed structure
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        Ok(data.claims.sub)
    }
}
