//! Data directory layout.

use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "GMSG_DATA_DIR";

/// Resolve the data directory.
///
/// Priority: `GMSG_DATA_DIR`, then `~/.gemini-messenger`, then
/// `.gemini-messenger` in the working directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".gemini-messenger");
    }

    PathBuf::from(".gemini-messenger")
}
