//! Shell configuration.
//!
//! Loads optional `.stoker/config.toml` from the working directory.

use serde::Deserialize;
use std::path::Path;

/// Shell settings; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each line in interactive mode.
    pub prompt: String,
    /// Log filter used when `RUST_LOG` is unset, e.g. `"warn"` or `"stoker=debug"`.
    pub log_level: String,
    /// Most completions shown for one request.
    pub suggest_limit: usize,
    /// Append "did you mean" hints to unknown command/option errors.
    pub did_you_mean: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            log_level: "warn".to_string(),
            suggest_limit: 20,
            did_you_mean: true,
        }
    }
}

impl ShellConfig {
    /// Load config from `.stoker/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".stoker").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
