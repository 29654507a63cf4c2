//! Global configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`GlobalConfig`]. Falls back to defaults when the file is missing or
//! malformed; a bad config never stops the messenger from starting.

use std::path::Path;

use messenger_types::config::GlobalConfig;

/// Load global configuration from `{data_dir}/config.toml`.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => sanitize(config),
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Replace values that would make every AI call fail with their defaults.
fn sanitize(mut config: GlobalConfig) -> GlobalConfig {
    let defaults = GlobalConfig::default();
    if config.model.trim().is_empty() {
        tracing::warn!("config.toml: empty model, using {}", defaults.model);
        config.model = defaults.model;
    }
    if config.default_system_instruction.trim().is_empty() {
        tracing::warn!("config.toml: empty default_system_instruction, using default");
        config.default_system_instruction = defaults.default_system_instruction;
    }
    if config.base_url.trim().is_empty() {
        config.base_url = defaults.base_url;
    }
    if config.request_timeout_secs == 0 {
        tracing::warn!("config.toml: request_timeout_secs must be positive, using default");
        config.request_timeout_secs = defaults.request_timeout_secs;
    }
    if config.api_key_env.is_empty() {
        config.api_key_env = defaults.api_key_env;
    }
    config
}
