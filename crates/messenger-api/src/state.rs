//! Application state wiring all services together.
//!
//! Services in `messenger-core` are generic over the storage and hashing
//! ports; AppState pins them to the SQLite store and Argon2 hasher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use messenger_core::chat::orchestrator::ConversationOrchestrator;
use messenger_core::chat::session_cache::SessionCache;
use messenger_core::chat::transcript::TranscriptStore;
use messenger_core::service::auth::AuthService;
use messenger_core::service::contact::ContactService;
use messenger_infra::config::load_global_config;
use messenger_infra::crypto::password::Argon2PasswordHasher;
use messenger_infra::filesystem::resolve_data_dir;
use messenger_infra::llm::create_provider;
use messenger_infra::secret::env::EnvCredentialSource;
use messenger_infra::sqlite::kv::SqliteKvStore;
use messenger_infra::sqlite::pool::{DatabasePool, database_url};
use messenger_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthService = AuthService<SqliteKvStore, Argon2PasswordHasher>;
pub type ConcreteContactService = ContactService<SqliteKvStore>;
pub type ConcreteTranscriptStore = TranscriptStore<SqliteKvStore>;
pub type ConcreteOrchestrator = ConversationOrchestrator<SqliteKvStore>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub contact_service: ConcreteContactService,
    pub transcripts: ConcreteTranscriptStore,
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub config: GlobalConfig,
    /// Environment variable the API key was read from, if any.
    pub api_key_source: Option<String>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state in the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::open(&resolve_data_dir()).await
    }

    /// Connect to the database in `data_dir` and wire the services.
    pub async fn open(data_dir: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let config = load_global_config(data_dir).await;
        let db_pool = DatabasePool::new(&database_url(data_dir)).await?;
        let store = SqliteKvStore::new(db_pool.clone());

        let credentials = EnvCredentialSource::new(config.api_key_env.clone());
        let (api_key_source, api_key) = match credentials.resolve() {
            Some((var, key)) => (Some(var), Some(key)),
            None => (None, None),
        };

        let provider = match create_provider(&config, api_key) {
            Ok(provider) => provider,
            Err(e) => {
                // AI contacts fall back to the apology; everything else still works.
                tracing::warn!(error = %e, "failed to create Gemini provider");
                None
            }
        };
        let sessions = Arc::new(SessionCache::from_config(provider, &config));

        let transcripts = TranscriptStore::new(store.clone());
        let contact_service = ContactService::new(store.clone(), transcripts.clone());
        let auth_service = AuthService::new(store, Argon2PasswordHasher::new(), sessions.clone());
        let orchestrator = ConversationOrchestrator::new(
            contact_service.clone(),
            transcripts.clone(),
            sessions,
        );

        Ok(Self {
            auth_service: Arc::new(auth_service),
            contact_service,
            transcripts,
            orchestrator: Arc::new(orchestrator),
            config,
            api_key_source,
            data_dir: data_dir.to_path_buf(),
            db_pool,
        })
    }

    /// Whether AI contacts can reach Gemini.
    pub fn ai_enabled(&self) -> bool {
        self.orchestrator.sessions().is_configured()
    }
}
