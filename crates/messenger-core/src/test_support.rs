//! Fakes shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use messenger_types::error::{AuthError, RepositoryError};
use messenger_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, Usage,
};
use tokio::sync::Semaphore;

use crate::llm::provider::LlmProvider;
use crate::service::hash::PasswordHasher;
use crate::storage::kv_store::KvStore;
use crate::storage::memory::InMemoryKvStore;

pub(crate) type CallLog = Arc<Mutex<Vec<CompletionRequest>>>;

/// Replies from a fixed script, then "ok" forever. Records every request.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: CallLog,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub(crate) fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// Every call waits for one permit added to the returned semaphore.
    pub(crate) fn gated(self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Self {
                gate: Some(gate.clone()),
                ..self
            },
            gate,
        )
    }

    pub(crate) fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()));
        next.map(|content| CompletionResponse {
            id: "scripted".to_string(),
            content,
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: 3,
                output_tokens: 5,
            },
        })
    }
}

/// Reversible "hash" so tests can assert on what was stored.
pub(crate) struct PlainHasher;

impl PasswordHasher for PlainHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        hash.strip_prefix("plain$") == Some(password)
    }
}

/// `PlainHasher` that parks on a semaphore when hashing one chosen password.
pub(crate) struct GatedHasher {
    slow: String,
    gate: Arc<Semaphore>,
}

impl GatedHasher {
    pub(crate) fn new(slow: &str) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Self {
                slow: slow.to_string(),
                gate: gate.clone(),
            },
            gate,
        )
    }
}

impl PasswordHasher for GatedHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        if password == self.slow {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
        PlainHasher.hash_password(password).await
    }

    async fn verify_password(&self, password: &str, hash: &str) -> bool {
        PlainHasher.verify_password(password, hash).await
    }
}

/// In-memory store whose writes can be made to fail.
#[derive(Clone)]
pub(crate) struct FlakyKvStore {
    inner: InMemoryKvStore,
    /// Writes still allowed; `usize::MAX` when healthy.
    sets_left: Arc<AtomicUsize>,
}

impl FlakyKvStore {
    /// Let `n` more writes through, then fail every write until `heal`.
    pub(crate) fn fail_sets_after(&self, n: usize) {
        self.sets_left.store(n, Ordering::SeqCst);
    }

    pub(crate) fn heal(&self) {
        self.sets_left.store(usize::MAX, Ordering::SeqCst);
    }
}

impl Default for FlakyKvStore {
    fn default() -> Self {
        Self {
            inner: InMemoryKvStore::new(),
            sets_left: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }
}

impl KvStore for FlakyKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let allowed = self
            .sets_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok();
        if !allowed {
            return Err(RepositoryError::Query(format!("write to {key} refused")));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.inner.delete(key).await
    }
}
