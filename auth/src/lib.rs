//! Authentication core library
//!
//! Provides the security primitives the HTTP service composes:
//! - Signed, time-limited bearer tokens (HS256)
//! - Per-client failed-login tracking with time-boxed lockout
//! - Password hashing (Argon2id)
//!
//! Everything here is framework-free; the web layer decides how request
//! context maps onto these primitives.
//!
//! # Examples
//!
//! ## Bearer Tokens
//! ```
//! use auth::TokenCodec;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.issue("alice", &["ADMIN".to_string()]).unwrap();
//! assert_eq!(codec.verify(&token).unwrap(), "alice");
//! ```
//!
//! ## Lockout
//! ```
//! use auth::{AttemptTracker, LockoutPolicy};
//!
//! let tracker = AttemptTracker::new(LockoutPolicy::default());
//! tracker.record_failure("10.0.0.5");
//! tracker.record_failure("10.0.0.5");
//! assert!(!tracker.is_locked("10.0.0.5"));
//!
//! tracker.record_failure("10.0.0.5");
//! assert!(tracker.is_locked("10.0.0.5"));
//! assert!(tracker.remaining_seconds("10.0.0.5") > 0);
//! ```

pub mod lockout;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use lockout::AttemptTracker;
pub use lockout::LockoutPolicy;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::TokenCodec;
pub use token::TokenError;
