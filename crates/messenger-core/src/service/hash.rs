//! PasswordHasher trait for credential storage.
//!
//! Defined in messenger-core so `AuthService` never sees a concrete
//! algorithm. The Argon2 adapter lives in messenger-infra.

use messenger_types::error::AuthError;

/// Abstraction over salted password hashing.
///
/// Hashing is deliberately slow, so both operations are async and adapters
/// keep the work off the async worker threads.
pub trait PasswordHasher: Send + Sync {
    /// Produce a self-describing hash string (salt and parameters included).
    fn hash_password(
        &self,
        password: &str,
    ) -> impl std::future::Future<Output = Result<String, AuthError>> + Send;

    /// Check `password` against a hash produced by `hash_password`.
    ///
    /// A malformed hash verifies as false.
    fn verify_password(
        &self,
        password: &str,
        hash: &str,
    ) -> impl std::future::Future<Output = bool> + Send;
}
