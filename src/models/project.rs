use super::config::Platform;
use camino::{Utf8Path, Utf8PathBuf};

/// Fixed locations inside the game project checkout.
///
/// Everything is derived from the project root and the project name, so the
/// tool can be run from any directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: Utf8PathBuf,
    name: String,
}

impl ProjectLayout {
    pub fn new<P: AsRef<Utf8Path>>(root: P, name: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            name: name.into(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// `<root>/<name>.uproject`
    pub fn project_file(&self) -> Utf8PathBuf {
        self.root.join(format!("{}.uproject", self.name))
    }

    pub fn source_dir(&self) -> Utf8PathBuf {
        self.root.join("Source")
    }

    /// `<root>/Releases/<version tag>`
    pub fn release_dir(&self, version_tag: &str) -> Utf8PathBuf {
        self.root.join("Releases").join(version_tag)
    }

    pub fn steam_app_id_file(&self) -> Utf8PathBuf {
        self.root.join("steam_appid.txt")
    }

    /// Crash reporter shipped in place of the engine's own CrashReportClient
    pub fn crash_reporter(&self, platform: Platform) -> Utf8PathBuf {
        self.root
            .join(format!("Mayday{}", platform.executable_suffix()))
    }
}
