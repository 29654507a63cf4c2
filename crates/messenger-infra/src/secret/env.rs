//! API key lookup from environment variables.
//!
//! The key is never stored by the application. It is read once at startup
//! from the first configured variable that holds a non-empty value, and
//! kept as a `SecretString` from then on.

use secrecy::SecretString;

/// Reads the Gemini API key from an ordered list of environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    vars: Vec<String>,
}

impl EnvCredentialSource {
    pub fn new(vars: Vec<String>) -> Self {
        Self { vars }
    }

    /// The first non-empty value, with the variable it came from.
    pub fn resolve(&self) -> Option<(String, SecretString)> {
        self.vars.iter().find_map(|var| match std::env::var(var) {
            Ok(val) if !val.trim().is_empty() => {
                Some((var.clone(), SecretString::from(val.trim().to_string())))
            }
            // Unset, empty or not valid Unicode: try the next one.
            _ => None,
        })
    }
}
