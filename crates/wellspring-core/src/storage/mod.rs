mod config;

pub use config::{Config, DisplayConfig, SessionConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/wellspring[-dev]/` based on WELLSPRING_ENV.
///
/// Set WELLSPRING_ENV=dev to use development data directory.
/// WELLSPRING_CONFIG_DIR replaces the whole path when set.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WELLSPRING_CONFIG_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("WELLSPRING_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("wellspring-dev")
            } else {
                base_dir.join("wellspring")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
