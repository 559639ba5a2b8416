//! Configuration Management
//!
//! Handles persistent configuration storage and environment overrides for
//! atlasform.

use crate::atlas::{Credentials, DEFAULT_BASE_URL};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "MONGODB_ATLAS_BASE_URL";
pub const ENV_PUBLIC_KEY: &str = "MONGODB_ATLAS_PUBLIC_KEY";
pub const ENV_PRIVATE_KEY: &str = "MONGODB_ATLAS_PRIVATE_KEY";
pub const ENV_ACCESS_TOKEN: &str = "MONGODB_ATLAS_ACCESS_TOKEN";
pub const ENV_PROJECT_ID: &str = "MONGODB_ATLAS_PROJECT_ID";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Atlas Admin API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Programmatic API public key
    #[serde(default)]
    pub public_key: Option<String>,
    /// Programmatic API private key
    #[serde(default)]
    pub private_key: Option<String>,
    /// Service account access token
    #[serde(default)]
    pub access_token: Option<String>,
    /// Default project for commands that take one
    #[serde(default)]
    pub project_id: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("atlasform").join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Self {
        Self::load_file().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load only what is stored on disk, without environment overrides
    pub fn load_file() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Overlay values found through `lookup` (normally the process environment)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_BASE_URL) {
            self.base_url = Some(v);
        }
        if let Some(v) = get(ENV_PUBLIC_KEY) {
            self.public_key = Some(v);
        }
        if let Some(v) = get(ENV_PRIVATE_KEY) {
            self.private_key = Some(v);
        }
        if let Some(v) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(v);
        }
        if let Some(v) = get(ENV_PROJECT_ID) {
            self.project_id = Some(v);
        }
        self
    }

    /// Overlay the values given to `configure`
    pub fn with_stored_values(
        mut self,
        project_id: Option<String>,
        public_key: Option<String>,
        private_key: Option<String>,
    ) -> Self {
        self.project_id = project_id.or(self.project_id);
        self.public_key = public_key.or(self.public_key);
        self.private_key = private_key.or(self.private_key);
        self
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective base URL (CLI > env > config > default)
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Access token wins over an API key pair; nothing configured means anonymous
    pub fn credentials(&self) -> Credentials {
        if let Some(token) = &self.access_token {
            return Credentials::access_token(token);
        }
        match (&self.public_key, &self.private_key) {
            (Some(public), Some(private)) => Credentials::api_key(public, private),
            _ => Credentials::Anonymous,
        }
    }

    /// Get effective project (CLI > env > config)
    pub fn effective_project(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string).or_else(|| self.project_id.clone())
    }
}
