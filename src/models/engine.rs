use super::config::{EngineVersion, Platform};
use camino::{Utf8Path, Utf8PathBuf};

/// Engine-version-dependent names.
///
/// UE4 and UE5 ship the same tooling under different executable names and
/// read their install root from different environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineProfile {
    pub version: EngineVersion,

    /// Environment variable holding the engine installation root
    pub root_env_var: &'static str,

    /// Editor executable stem, without platform suffix
    pub editor: &'static str,

    /// Commandlet editor executable stem passed to BuildCookRun
    pub editor_cmd: &'static str,
}

impl EngineProfile {
    pub fn for_version(version: EngineVersion) -> Self {
        match version {
            EngineVersion::Ue4 => Self {
                version,
                root_env_var: "UE4_ROOT",
                editor: "UE4Editor",
                editor_cmd: "UE4Editor-Cmd",
            },
            EngineVersion::Ue5 => Self {
                version,
                root_env_var: "UE_ROOT",
                editor: "UnrealEditor",
                editor_cmd: "UnrealEditor-Cmd",
            },
        }
    }

    /// RunUAT entry point for the given host
    pub fn automation_tool(&self, engine_dir: &Utf8Path, host: Platform) -> Utf8PathBuf {
        let script = match host {
            Platform::Windows => "RunUAT.bat",
            Platform::Linux => "RunUAT.sh",
        };
        engine_dir
            .join("Engine")
            .join("Build")
            .join("BatchFiles")
            .join(script)
    }

    /// Editor binary used to launch the game locally
    pub fn editor_executable(&self, engine_dir: &Utf8Path, host: Platform) -> Utf8PathBuf {
        engine_dir
            .join("Engine")
            .join("Binaries")
            .join(host.engine_name())
            .join(format!("{}{}", self.editor, host.executable_suffix()))
    }

    /// Folder BuildCookRun archives a client build into, under `-archivedirectory`.
    ///
    /// UE4 still suffixes client builds with `NoEditor`.
    pub fn archive_dir_name(&self, platform: Platform) -> String {
        match self.version {
            EngineVersion::Ue4 => format!("{}NoEditor", platform.release_name()),
            EngineVersion::Ue5 => platform.release_name().to_string(),
        }
    }

    /// File name given to `-unrealexe`
    pub fn editor_cmd_name(&self, host: Platform) -> String {
        format!("{}{}", self.editor_cmd, host.executable_suffix())
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self::for_version(EngineVersion::default())
    }
}
