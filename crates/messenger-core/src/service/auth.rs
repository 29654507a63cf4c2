//! Local authentication service.
//!
//! Credentials live under the global `users` key as a map of email ->
//! `StoredCredential`. The logged-in user is persisted under `currentUser`
//! so it survives between CLI invocations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use messenger_types::error::AuthError;
use messenger_types::keys::{CURRENT_USER_KEY, USERS_KEY};
use messenger_types::user::{StoredCredential, User};

use super::hash::PasswordHasher;
use crate::chat::session_cache::SessionCache;
use crate::storage::kv_store::{KvStore, load_json, save_json};

type CredentialTable = HashMap<String, StoredCredential>;

pub struct AuthService<K: KvStore, H: PasswordHasher> {
    store: K,
    hasher: H,
    /// Sessions were built for the previous user; they go when the user changes.
    sessions: Arc<SessionCache>,
    write_lock: Mutex<()>,
}

impl<K: KvStore, H: PasswordHasher> AuthService<K, H> {
    pub fn new(store: K, hasher: H, sessions: Arc<SessionCache>) -> Self {
        Self {
            store,
            hasher,
            sessions,
            write_lock: Mutex::new(()),
        }
    }

    async fn credentials(&self) -> Result<CredentialTable, AuthError> {
        Ok(load_json(&self.store, USERS_KEY).await?.unwrap_or_default())
    }

    /// Register a new user and log them in.
    ///
    /// The email is trimmed; the password is taken as typed. An existing
    /// registration is never overwritten.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        // Hash before taking the lock so a slow hash never blocks other writers.
        let credential = StoredCredential {
            password_hash: self.hasher.hash_password(password).await?,
            created_at: Utc::now(),
        };

        {
            let _guard = self.write_lock.lock().await;
            let mut table = self.credentials().await?;
            if table.contains_key(email) {
                return Err(AuthError::UserExists);
            }
            table.insert(email.to_string(), credential);
            save_json(&self.store, USERS_KEY, &table).await?;
        }

        let user = User::new(email);
        self.set_current(&user).await?;
        tracing::info!(user = %user, "user registered");
        Ok(user)
    }

    /// Check credentials and make `email` the current user.
    ///
    /// Unknown emails and wrong passwords fail the same way and change nothing.
    pub async fn log_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let table = self.credentials().await?;
        let verified = match table.get(email) {
            Some(cred) => self.hasher.verify_password(password, &cred.password_hash).await,
            None => false,
        };
        if !verified {
            tracing::debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let user = User::new(email);
        self.set_current(&user).await?;
        tracing::info!(user = %user, "user logged in");
        Ok(user)
    }

    /// Forget the current user and every cached AI session.
    pub async fn log_out(&self) -> Result<Option<User>, AuthError> {
        let previous = self.current_user().await?;
        self.sessions.clear_all();
        self.store.delete(CURRENT_USER_KEY).await?;
        if let Some(user) = &previous {
            tracing::info!(user = %user, "user logged out");
        }
        Ok(previous)
    }

    pub async fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(load_json(&self.store, CURRENT_USER_KEY).await?)
    }

    /// The current user, or `AuthError::NotLoggedIn`.
    pub async fn require_user(&self) -> Result<User, AuthError> {
        self.current_user().await?.ok_or(AuthError::NotLoggedIn)
    }

    async fn set_current(&self, user: &User) -> Result<(), AuthError> {
        if self.current_user().await?.as_ref() != Some(user) {
            self.sessions.clear_all();
        }
        save_json(&self.store, CURRENT_USER_KEY, user).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::storage::memory::InMemoryKvStore;
    use crate::test_support::{GatedHasher, PlainHasher, ScriptedProvider};
    use messenger_types::config::GlobalConfig;
    use messenger_types::contact::ContactId;

    fn service() -> (AuthService<InMemoryKvStore, PlainHasher>, InMemoryKvStore, Arc<SessionCache>) {
        let store = InMemoryKvStore::new();
        let sessions = Arc::new(SessionCache::from_config(
            Some(BoxLlmProvider::new(ScriptedProvider::replying(&[]))),
            &GlobalConfig::default(),
        ));
        (
            AuthService::new(store.clone(), PlainHasher, sessions.clone()),
            store,
            sessions,
        )
    }

    #[tokio::test]
    async fn sign_up_stores_hash_and_logs_in() {
        let (auth, store, _) = service();
        let user = auth.sign_up("  ada@example.com ", "secret").await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(auth.current_user().await.unwrap(), Some(user));

        let table: CredentialTable = load_json(&store, USERS_KEY).await.unwrap().unwrap();
        assert_eq!(table["ada@example.com"].password_hash, "plain$secret");
    }

    #[tokio::test]
    async fn sign_up_requires_both_fields() {
        let (auth, _, _) = service();
        let err = auth.sign_up("   ", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        let err = auth.sign_up("ada@example.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        assert!(auth.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_sign_up_keeps_original_credential() {
        let (auth, _, _) = service();
        auth.sign_up("ada@example.com", "first").await.unwrap();
        let err = auth.sign_up("ada@example.com", "second").await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists));

        assert!(auth.log_in("ada@example.com", "first").await.is_ok());
        assert!(auth.log_in("ada@example.com", "second").await.is_err());
    }

    #[tokio::test]
    async fn log_in_rejects_bad_credentials_without_state_change() {
        let (auth, _, _) = service();
        auth.sign_up("ada@example.com", "secret").await.unwrap();
        auth.log_out().await.unwrap();

        let err = auth.log_in("ada@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        let err = auth.log_in("nobody@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(auth.current_user().await.unwrap().is_none());

        let user = auth.log_in("ada@example.com", "secret").await.unwrap();
        assert_eq!(auth.require_user().await.unwrap(), user);
    }

    #[tokio::test]
    async fn log_out_clears_user_and_sessions() {
        let (auth, _, sessions) = service();
        auth.sign_up("ada@example.com", "secret").await.unwrap();
        sessions.get_or_create(&ContactId::new(), None, &[]).unwrap();

        let previous = auth.log_out().await.unwrap();
        assert_eq!(previous.unwrap().email, "ada@example.com");
        assert!(sessions.is_empty());
        assert!(matches!(
            auth.require_user().await.unwrap_err(),
            AuthError::NotLoggedIn
        ));
    }

    #[tokio::test]
    async fn switching_user_drops_sessions() {
        let (auth, _, sessions) = service();
        auth.sign_up("ada@example.com", "a").await.unwrap();
        auth.sign_up("grace@example.com", "g").await.unwrap();
        auth.log_in("ada@example.com", "a").await.unwrap();
        sessions.get_or_create(&ContactId::new(), None, &[]).unwrap();

        // same user again keeps the cache
        auth.log_in("ada@example.com", "a").await.unwrap();
        assert_eq!(sessions.len(), 1);

        auth.log_in("grace@example.com", "g").await.unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn slow_hash_does_not_hold_the_write_lock() {
        let store = InMemoryKvStore::new();
        let sessions = Arc::new(SessionCache::from_config(None, &GlobalConfig::default()));
        let (hasher, gate) = GatedHasher::new("slow");
        let auth = Arc::new(AuthService::new(store, hasher, sessions));

        let pending = tokio::spawn({
            let auth = auth.clone();
            async move { auth.sign_up("ada@example.com", "slow").await }
        });
        tokio::task::yield_now().await;

        // Ada's hash is still parked; Grace's sign-up must not wait for it.
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            auth.sign_up("grace@example.com", "fast"),
        )
        .await
        .expect("sign-up waited on another user's hash")
        .unwrap();
        assert!(!pending.is_finished());

        gate.add_permits(1);
        pending.await.unwrap().unwrap();
        assert!(auth.log_in("ada@example.com", "slow").await.is_ok());
    }
}
