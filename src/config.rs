//! Two-tier configuration (§9 "Config 'object' contracts", SPEC_FULL §10.3).
//!
//! User config lives at `~/.config/valsync/config.toml` and covers the
//! engine's credential and ignore-file settings; a working-copy-level
//! override (`--local`) layers on top with the same shape.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorTemplate {
    #[default]
    Deno,
    None,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DangerousOperations {
    /// If false, destructive ops skip the confirmation prompt (treated as
    /// "user said yes"). Default true: prompt.
    #[serde(default = "default_true")]
    pub confirmation: bool,
}

fn default_true() -> bool {
    true
}

impl DangerousOperations {
    fn with_defaults() -> Self {
        Self { confirmation: true }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub global_ignore_files: Vec<PathBuf>,
    #[serde(default = "DangerousOperations::with_defaults")]
    pub dangerous_operations: DangerousOperations,
    #[serde(default)]
    pub editor_template: EditorTemplate,
    #[serde(default)]
    pub default_privacy: Option<crate::types::Privacy>,
    /// Default bounded-concurrency for Push/Clone (SPEC_FULL §11).
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl Config {
    pub fn user_config_path() -> Result<PathBuf, EngineError> {
        let base = dirs::config_dir()
            .ok_or_else(|| EngineError::programmer("no config directory for this platform"))?;
        Ok(base.join("valsync").join("config.toml"))
    }

    pub fn load_user() -> Result<Self, EngineError> {
        Self::load_from(&Self::user_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, EngineError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| EngineError::InvalidSchema { message: e.to_string() })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(self).map_err(|e| EngineError::programmer(e.to_string()))?;

        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, rendered)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn save_user(&self) -> Result<(), EngineError> {
        self.save_to(&Self::user_config_path()?)
    }

    /// Resolves the effective API key: explicit config value, else the
    /// `API_KEY` environment variable (§6.3).
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| std::env::var("API_KEY").ok())
    }

    /// Recognized configuration keys (§9), for `config options`.
    pub fn recognized_keys() -> &'static [&'static str] {
        &[
            "api-key",
            "refresh-token",
            "global-ignore-files",
            "dangerous-operations.confirmation",
            "editor-template",
            "default-privacy",
            "concurrency",
        ]
    }
}
