//! Argon2id password hashing.
//!
//! Produces PHC strings (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`) so
//! the salt and cost parameters travel with the hash. Each call costs tens of
//! milliseconds of CPU, so the work runs on tokio's blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use messenger_core::service::hash::PasswordHasher;
use messenger_types::error::AuthError;

/// Argon2id with OWASP-recommended minimum cost (19 MiB, 2 passes, 1 lane).
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    fn argon2() -> Result<Argon2<'static>, AuthError> {
        let params =
            Params::new(19456, 2, 1, None).map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2PasswordHasher::argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    // Parameters are read from the PHC string, so older hashes still verify.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

impl PasswordHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let (password, hash) = (password.to_owned(), hash.to_owned());
        match tokio::task::spawn_blocking(move || verify_blocking(&password, &hash)).await {
            Ok(verified) => verified,
            Err(e) => {
                tracing::warn!(error = %e, "password verification task failed");
                false
            }
        }
    }
}
