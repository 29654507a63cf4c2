//! LLM provider implementations.
//!
//! Holds the Gemini implementation of the [`LlmProvider`] trait defined in
//! `messenger-core`, plus [`create_provider`], which builds it from the global
//! config and the resolved API key.
//!
//! [`LlmProvider`]: messenger_core::llm::provider::LlmProvider

pub mod gemini;

use secrecy::SecretString;

use messenger_core::llm::box_provider::BoxLlmProvider;
use messenger_types::config::GlobalConfig;
use messenger_types::llm::LlmError;

use self::gemini::GeminiProvider;

/// Build the chat provider, or `Ok(None)` when no API key is available.
///
/// A missing key is not an error here: the messenger still runs and AI
/// contacts answer with the apology message until a key is configured.
pub fn create_provider(
    config: &GlobalConfig,
    api_key: Option<SecretString>,
) -> Result<Option<BoxLlmProvider>, LlmError> {
    let Some(api_key) = api_key else {
        tracing::info!("no Gemini API key configured; AI contacts are disabled");
        return Ok(None);
    };

    let provider = GeminiProvider::new(
        api_key,
        config.model.clone(),
        std::time::Duration::from_secs(config.request_timeout_secs),
    )?
    .with_base_url(config.base_url.clone());

    Ok(Some(BoxLlmProvider::new(provider)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_without_key() {
        let provider = create_provider(&GlobalConfig::default(), None).unwrap();
        assert!(provider.is_none());
    }

    #[test]
    fn test_create_provider_with_key() {
        let provider = create_provider(
            &GlobalConfig::default(),
            Some(SecretString::from("test-key-not-real")),
        )
        .unwrap()
        .unwrap();
        assert_eq!(provider.name(), "gemini");
    }
}
