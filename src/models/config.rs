use camino::Utf8PathBuf;
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Project configuration from Build.json
///
/// Loaded once per invocation and never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,

    /// Target platforms in build order, duplicates collapse to the first entry
    pub platforms: IndexSet<Platform>,

    pub configuration: BuildConfiguration,

    #[serde(rename = "pdb")]
    pub keep_debug_symbols: bool,

    #[serde(
        rename = "outputDir",
        default,
        deserialize_with = "deserialize_optional_path"
    )]
    pub output_dir: Option<Utf8PathBuf>,

    #[serde(
        rename = "engineDir",
        default,
        deserialize_with = "deserialize_optional_path"
    )]
    pub engine_dir: Option<Utf8PathBuf>,

    #[serde(rename = "sourceEngine", default)]
    pub source_engine: bool,

    #[serde(rename = "engineVersion", default)]
    pub engine_version: EngineVersion,

    #[serde(default)]
    pub itch: Option<ItchConfig>,

    #[serde(default)]
    pub steam: Option<SteamConfig>,
}

/// Keys that must be present in Build.json
pub const REQUIRED_KEYS: [&str; 4] = ["name", "platforms", "configuration", "pdb"];

/// Target platform of a packaged build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(alias = "Win64")]
    Windows,
    Linux,
}

impl Platform {
    /// Name used by the engine tooling (`-targetplatform`, `Binaries/<name>`)
    pub fn engine_name(self) -> &'static str {
        match self {
            Platform::Windows => "Win64",
            Platform::Linux => "Linux",
        }
    }

    /// Name used for output folders and chunk file names
    pub fn release_name(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
        }
    }

    pub fn executable_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Linux => "",
        }
    }

    /// Platform this binary is running on
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.release_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildConfiguration {
    Debug,
    Development,
    Shipping,
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildConfiguration::Debug => "Debug",
            BuildConfiguration::Development => "Development",
            BuildConfiguration::Shipping => "Shipping",
        };
        f.write_str(name)
    }
}

/// Major engine release the project is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineVersion {
    #[serde(rename = "UE4")]
    Ue4,
    #[serde(rename = "UE5")]
    #[default]
    Ue5,
}

/// itch.io settings: parallel branch and directory lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItchConfig {
    pub user: String,
    pub project: String,
    pub branches: Vec<String>,
    pub directories: Vec<String>,
}

/// One itch.io upload: a channel name and the output sub-directory pushed to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItchChannel {
    pub branch: String,
    pub directory: String,
}

impl ItchConfig {
    /// Target of a butler push, e.g. `studio/game:windows`
    pub fn target(&self, branch: &str) -> String {
        format!("{}/{}:{}", self.user, self.project, branch)
    }

    /// Branches paired with their directories, in configured order
    pub fn channels(&self) -> Vec<ItchChannel> {
        self.branches
            .iter()
            .zip(&self.directories)
            .map(|(branch, directory)| ItchChannel {
                branch: branch.clone(),
                directory: directory.clone(),
            })
            .collect()
    }
}

/// Steam settings: app build manifests relative to the config directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteamConfig {
    #[serde(default)]
    pub apps: Vec<Utf8PathBuf>,
}

/// Unset paths may be written as a missing key, `null`, an empty string or "None".
fn deserialize_optional_path<'de, D>(deserializer: D) -> Result<Option<Utf8PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|v| !v.trim().is_empty() && v != "None")
        .map(Utf8PathBuf::from))
}
