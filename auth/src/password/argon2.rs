use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Memory cost in KiB.
const MEMORY_KIB: u32 = 60_000;
const ITERATIONS: u32 = 10;
const PARALLELISM: u32 = 1;
/// Digest length in bytes.
const OUTPUT_LEN: usize = 32;

/// Password hashing implementation (Argon2id).
///
/// Hashes carry their own parameters in PHC string format, so verification
/// keeps working for hashes produced under older parameter sets.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a password hasher with the service's fixed cost parameters.
    pub fn new() -> Self {
        let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, Some(OUTPUT_LEN))
            .expect("hard-coded Argon2 parameters are in range");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Returns
    /// PHC string format hash (algorithm, parameters, salt, and digest)
    ///
    /// # Errors
    /// * `HashingFailed` - the hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored PHC string hash.
    ///
    /// # Errors
    /// * `VerificationFailed` - the stored hash could not be parsed
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
