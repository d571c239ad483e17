use crate::models::config::REQUIRED_KEYS;
use crate::models::ProjectConfig;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Errors raised while loading Build.json
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing required key '{key}' in {path}")]
    MissingKey { path: Utf8PathBuf, key: &'static str },

    #[error("{path}: {message}")]
    Invalid { path: Utf8PathBuf, message: String },

    #[error("Steam app manifest listed in {path} not found: {manifest}")]
    MissingManifest {
        path: Utf8PathBuf,
        manifest: Utf8PathBuf,
    },
}

/// Configuration manager for the project's Build.json.
///
/// Build.json lives in the project's `Config/` directory. Steam app manifests
/// are resolved relative to that same directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a manager for the config file at `config_path`.
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Manager for `<project_root>/Config/Build.json`
    pub fn for_project_root<P: AsRef<Utf8Path>>(project_root: P) -> Self {
        Self::new(project_root.as_ref().join("Config").join("Build.json"))
    }

    /// Load and validate the project configuration.
    pub fn load(&self) -> Result<ProjectConfig, ConfigError> {
        let file_contents = fs::read_to_string(&self.config_path).map_err(|source| {
            ConfigError::Read {
                path: self.config_path.clone(),
                source,
            }
        })?;

        let config = self.parse(&file_contents)?;

        tracing::info!(
            "Loaded project config from {} - project: {}, platforms: {}",
            self.config_path,
            config.name,
            config.platforms.len()
        );
        Ok(config)
    }

    /// Parse and validate config text as if it came from this manager's path.
    pub fn parse(&self, contents: &str) -> Result<ProjectConfig, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(contents).map_err(|source| self.parse_error(source))?;

        // Check required keys up front so the error names the key, not a serde position
        for key in REQUIRED_KEYS {
            if value.get(key).is_none_or(|v| v.is_null()) {
                return Err(ConfigError::MissingKey {
                    path: self.config_path.clone(),
                    key,
                });
            }
        }

        let config: ProjectConfig =
            serde_json::from_value(value).map_err(|source| self.parse_error(source))?;

        self.validate(&config)?;
        Ok(config)
    }

    fn validate(&self, config: &ProjectConfig) -> Result<(), ConfigError> {
        if config.name.trim().is_empty() {
            return Err(self.invalid("project name is empty"));
        }

        if config.platforms.is_empty() {
            return Err(self.invalid("no platforms configured"));
        }

        if let Some(itch) = &config.itch {
            if itch.branches.len() != itch.directories.len() {
                return Err(self.invalid(format!(
                    "itch lists {} branches but {} directories",
                    itch.branches.len(),
                    itch.directories.len()
                )));
            }
        }

        Ok(())
    }

    fn parse_error(&self, source: serde_json::Error) -> ConfigError {
        ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::Invalid {
            path: self.config_path.clone(),
            message: message.into(),
        }
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Directory Steam app manifests are relative to.
    pub fn config_dir(&self) -> &Utf8Path {
        self.config_path.parent().unwrap_or(Utf8Path::new("."))
    }
}
