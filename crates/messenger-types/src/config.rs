//! Global configuration types.
//!
//! `GlobalConfig` represents the optional `config.toml` in the data
//! directory. Every field has a default so an absent file is valid.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

/// Top-level configuration for Gemini Messenger.
///
/// Loaded from `~/.gemini-messenger/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Gemini model used for every AI contact.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative-language API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Persona used when an AI contact has no system instruction.
    #[serde(default = "default_system_instruction")]
    pub default_system_instruction: String,

    /// Upper bound on a single AI call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Environment variables checked, in order, for the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_system_instruction() -> String {
    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> Vec<String> {
    vec!["GEMINI_API_KEY".to_string(), "API_KEY".to_string()]
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            default_system_instruction: default_system_instruction(),
            request_timeout_secs: default_request_timeout_secs(),
            api_key_env: default_api_key_env(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.default_system_instruction, "You are a helpful assistant.");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.api_key_env, vec!["GEMINI_API_KEY", "API_KEY"]);
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
model = "gemini-2.5-pro"
request_timeout_secs = 15
api_key_env = ["MY_KEY"]
temperature = 0.4
max_output_tokens = 2048
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.api_key_env, vec!["MY_KEY"]);
        assert!((config.temperature.unwrap() - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.max_output_tokens, Some(2048));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
