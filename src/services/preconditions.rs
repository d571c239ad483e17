//! Environment preconditions checked before any external tool runs.
//!
//! Resolves the engine installation directory, the build output directory and
//! the Steam uploader environment. Nothing here touches the filesystem beyond
//! existence checks.

use crate::models::EngineProfile;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use thiserror::Error;

pub const STEAM_USER_VAR: &str = "STEAM_USER";
pub const STEAM_BUILDER_VAR: &str = "STEAM_BUILDER";

/// Errors raised when a precondition is not met
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Engine directory was set neither in Build.json nor in the {variable} environment variable")]
    EngineDirUnset { variable: String },

    #[error("Engine directory provided in {origin} does not exist: {path}")]
    EngineDirMissing { origin: String, path: Utf8PathBuf },

    #[error("Output directory was neither set in Build.json nor passed on the command line")]
    OutputDirUnset,

    #[error("{purpose} was not provided in the {variable} environment variable")]
    VariableUnset {
        variable: &'static str,
        purpose: &'static str,
    },
}

impl PreconditionError {
    /// Environment problem, as opposed to a missing command-line argument
    pub fn is_environment(&self) -> bool {
        !matches!(self, PreconditionError::OutputDirUnset)
    }
}

/// Snapshot of the process environment: variables and current directory
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
    current_dir: Utf8PathBuf,
}

impl Environment {
    pub fn new<P: AsRef<Utf8Path>>(current_dir: P) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: current_dir.as_ref().to_path_buf(),
        }
    }

    /// Capture the running process' environment. Non-UTF-8 variables are ignored.
    pub fn from_process() -> anyhow::Result<Self> {
        let current_dir = Utf8PathBuf::try_from(std::env::current_dir()?)?;
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Ok(Self { vars, current_dir })
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Value of `key`; empty values count as unset
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Make `path` absolute against the captured current directory
    pub fn absolute(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }
}

/// Resolve the engine installation directory.
///
/// The Build.json value wins when it exists on disk, otherwise the profile's
/// environment variable is used.
pub fn resolve_engine_dir(
    configured: Option<&Utf8Path>,
    profile: &EngineProfile,
    env: &Environment,
) -> Result<Utf8PathBuf, PreconditionError> {
    let mut missing = None;

    if let Some(dir) = configured {
        let dir = env.absolute(dir);
        if dir.is_dir() {
            tracing::info!("Using engine directory from Build.json: {}", dir);
            return Ok(dir);
        }
        tracing::warn!("Engine directory from Build.json does not exist: {}", dir);
        missing = Some(PreconditionError::EngineDirMissing {
            origin: "Build.json".to_string(),
            path: dir,
        });
    }

    match env.var(profile.root_env_var) {
        Some(value) => {
            let dir = env.absolute(Utf8Path::new(value));
            if dir.is_dir() {
                tracing::info!("Using engine directory from {}: {}", profile.root_env_var, dir);
                Ok(dir)
            } else {
                Err(PreconditionError::EngineDirMissing {
                    origin: profile.root_env_var.to_string(),
                    path: dir,
                })
            }
        }
        None => Err(missing.unwrap_or_else(|| PreconditionError::EngineDirUnset {
            variable: profile.root_env_var.to_string(),
        })),
    }
}

/// Resolve the output directory from Build.json or the positional argument.
pub fn resolve_output_dir(
    configured: Option<&Utf8Path>,
    argument: Option<&str>,
    env: &Environment,
) -> Result<Utf8PathBuf, PreconditionError> {
    let dir = match (configured, argument) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(arg)) if !arg.trim().is_empty() => Utf8PathBuf::from(arg),
        _ => return Err(PreconditionError::OutputDirUnset),
    };
    Ok(env.absolute(&dir))
}

/// Credentials and SDK location for steamcmd
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamEnvironment {
    pub user: String,
    pub builder_dir: Utf8PathBuf,
}

impl SteamEnvironment {
    /// steamcmd entry point inside the SDK builder folder.
    ///
    /// The Windows SDK folder is named `builder`, the Linux one `builder_linux`.
    pub fn steamcmd(&self) -> Utf8PathBuf {
        let program = if self.builder_dir.as_str().trim_end_matches(['/', '\\']).ends_with("builder") {
            "SteamCmd.exe"
        } else {
            "steamcmd.sh"
        };
        self.builder_dir.join(program)
    }
}

pub fn resolve_steam_env(env: &Environment) -> Result<SteamEnvironment, PreconditionError> {
    let user = env
        .var(STEAM_USER_VAR)
        .ok_or(PreconditionError::VariableUnset {
            variable: STEAM_USER_VAR,
            purpose: "Steam user",
        })?;
    let builder = env
        .var(STEAM_BUILDER_VAR)
        .ok_or(PreconditionError::VariableUnset {
            variable: STEAM_BUILDER_VAR,
            purpose: "Steam SDK builder directory",
        })?;

    Ok(SteamEnvironment {
        user: user.to_string(),
        builder_dir: env.absolute(Utf8Path::new(builder)),
    })
}
