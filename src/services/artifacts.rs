//! Post-processing of the engine's packaged output.
//!
//! After BuildCookRun archives a platform build, the output tree still holds
//! debug symbols, staging manifests and generically named pak chunks. The
//! [`ArtifactPostProcessor`] walks that tree once and applies an ordered table
//! of filename rules, then strips folders the shipped game never reads and
//! installs the side files the launcher expects.
//!
//! Rules are grouped into independent categories. Inside a category the first
//! matching rule wins; a file moved or deleted by one category is not offered
//! to the next.

use crate::models::{Platform, ProjectLayout};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use thiserror::Error;
use walkdir::WalkDir;

/// Folders removed from every packaged build, relative to the build root.
/// `{project}` is replaced with the project name.
const UNNEEDED_DIRS: [&str; 4] = [
    "{project}/Config",
    "Engine/Content",
    "Engine/Binaries/ThirdParty/NVIDIA",
    "Engine/Binaries/ThirdParty/PhysX3",
];

const THIRD_PARTY_DIR: &str = "ThirdParty";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot move {from}: destination {to} already exists")]
    DestinationExists { from: Utf8PathBuf, to: Utf8PathBuf },

    #[error("Build output {path} does not exist after packaging")]
    MissingBuildOutput { path: Utf8PathBuf },

    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: Utf8PathBuf,
        source: walkdir::Error,
    },
}

fn io_err(action: &'static str, path: &Utf8Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// What to do with a file once a rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Move into the release folder unless symbols are kept (third-party symbols always move)
    RelocateDebugSymbols,
    /// Copy into the release folder, leaving the original in place
    CopyToRelease,
    Delete,
    /// Rename to `<project>-<platform>-<N>[b].pak`; the first capture group is N
    RenameChunk { optional: bool },
}

/// One (predicate, action) entry of the rule table
#[derive(Debug, Clone)]
pub struct ArtifactRule {
    pub name: &'static str,
    pattern: Regex,
    pub action: RuleAction,
}

impl ArtifactRule {
    fn new(name: &'static str, pattern: &str, action: RuleAction) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid artifact rule regex"),
            action,
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}

/// Rules evaluated first-match-wins
#[derive(Debug, Clone)]
pub struct RuleCategory {
    pub name: &'static str,
    pub rules: Vec<ArtifactRule>,
}

impl RuleCategory {
    pub fn first_match(&self, file_name: &str) -> Option<&ArtifactRule> {
        self.rules.iter().find(|rule| rule.matches(file_name))
    }
}

/// The default rule table
pub fn default_rules() -> Vec<RuleCategory> {
    vec![
        RuleCategory {
            name: "artifacts",
            rules: vec![
                ArtifactRule::new(
                    "debug-symbols",
                    r"\.(pdb|debug|sym)$",
                    RuleAction::RelocateDebugSymbols,
                ),
                ArtifactRule::new("executable", r"\.exe$", RuleAction::CopyToRelease),
                ArtifactRule::new("manifest", r"^Manifest.*\.txt$", RuleAction::Delete),
            ],
        },
        RuleCategory {
            name: "chunks",
            rules: vec![
                ArtifactRule::new(
                    "optional-chunk",
                    r"^pakchunk([0-9]+)optional.*\.pak$",
                    RuleAction::RenameChunk { optional: true },
                ),
                ArtifactRule::new(
                    "chunk",
                    r"^pakchunk([0-9]+).*\.pak$",
                    RuleAction::RenameChunk { optional: false },
                ),
            ],
        },
    ]
}

/// Counts of what a post-processing pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactReport {
    pub relocated: usize,
    pub copied: usize,
    pub deleted: usize,
    pub renamed: usize,
    pub removed_dirs: usize,
    pub side_files: usize,
}

impl ArtifactReport {
    pub fn summary(&self) -> String {
        format!(
            "{} symbols relocated, {} executables copied, {} manifests deleted, {} chunks renamed, {} folders removed, {} side files installed",
            self.relocated,
            self.copied,
            self.deleted,
            self.renamed,
            self.removed_dirs,
            self.side_files
        )
    }
}

/// Post-processor for one platform build
#[derive(Debug, Clone)]
pub struct ArtifactPostProcessor {
    project_name: String,
    platform: Platform,
    keep_debug_symbols: bool,
    release_dir: Utf8PathBuf,
    categories: Vec<RuleCategory>,
}

impl ArtifactPostProcessor {
    /// # Arguments
    /// * `release_dir` - `Releases/<tag>/<platform>` folder receiving symbols and executables
    pub fn new(
        project_name: impl Into<String>,
        platform: Platform,
        keep_debug_symbols: bool,
        release_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            platform,
            keep_debug_symbols,
            release_dir: release_dir.into(),
            categories: default_rules(),
        }
    }

    pub fn categories(&self) -> &[RuleCategory] {
        &self.categories
    }

    /// Chunk name for index `index`, e.g. `Nova-Windows-3b.pak`
    pub fn chunk_name(&self, index: &str, optional: bool) -> String {
        format!(
            "{}-{}-{}{}.pak",
            self.project_name,
            self.platform.release_name(),
            index,
            if optional { "b" } else { "" }
        )
    }

    /// Run every step over `build_dir`: rules, folder cleanup, side files.
    ///
    /// The build directory must exist; the engine is expected to have archived into it.
    pub fn process(
        &self,
        build_dir: &Utf8Path,
        layout: &ProjectLayout,
    ) -> Result<ArtifactReport, ArtifactError> {
        if !build_dir.is_dir() {
            return Err(ArtifactError::MissingBuildOutput {
                path: build_dir.to_path_buf(),
            });
        }

        let mut report = ArtifactReport::default();

        self.apply_rules(build_dir, &mut report)?;
        self.remove_unneeded_dirs(build_dir, &mut report)?;
        self.install_side_files(build_dir, layout, &mut report)?;

        tracing::info!("Post-processed {} build: {}", self.platform, report.summary());
        Ok(report)
    }

    /// Apply the rule table to every regular file under `build_dir`.
    pub fn apply_rules(
        &self,
        build_dir: &Utf8Path,
        report: &mut ArtifactReport,
    ) -> Result<(), ArtifactError> {
        for file in collect_files(build_dir)? {
            let Some(file_name) = file.file_name().map(str::to_string) else {
                continue;
            };

            for category in &self.categories {
                let Some(rule) = category.first_match(&file_name) else {
                    continue;
                };
                tracing::debug!("{}: rule {}/{}", file, category.name, rule.name);

                if self.apply(rule, &file, &file_name, build_dir, report)? == Outcome::Consumed {
                    break;
                }
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        rule: &ArtifactRule,
        file: &Utf8Path,
        file_name: &str,
        build_dir: &Utf8Path,
        report: &mut ArtifactReport,
    ) -> Result<Outcome, ArtifactError> {
        match rule.action {
            RuleAction::RelocateDebugSymbols => {
                if is_third_party(file, build_dir) || !self.keep_debug_symbols {
                    self.ensure_release_dir()?;
                    move_file(file, &self.release_dir.join(file_name))?;
                    report.relocated += 1;
                    return Ok(Outcome::Consumed);
                }
                Ok(Outcome::Kept)
            }
            RuleAction::CopyToRelease => {
                self.ensure_release_dir()?;
                let target = self.release_dir.join(file_name);
                fs::copy(file, &target).map_err(|e| io_err("copy", file, e))?;
                report.copied += 1;
                Ok(Outcome::Kept)
            }
            RuleAction::Delete => {
                fs::remove_file(file).map_err(|e| io_err("delete", file, e))?;
                report.deleted += 1;
                Ok(Outcome::Consumed)
            }
            RuleAction::RenameChunk { optional } => {
                let Some(index) = rule
                    .pattern
                    .captures(file_name)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                else {
                    return Ok(Outcome::Kept);
                };

                let parent = file.parent().unwrap_or(build_dir);
                move_file(file, &parent.join(self.chunk_name(&index, optional)))?;
                report.renamed += 1;
                Ok(Outcome::Consumed)
            }
        }
    }

    /// Delete folders the packaged game never reads.
    pub fn remove_unneeded_dirs(
        &self,
        build_dir: &Utf8Path,
        report: &mut ArtifactReport,
    ) -> Result<(), ArtifactError> {
        for relative in UNNEEDED_DIRS {
            let dir = build_dir.join(relative.replace("{project}", &self.project_name));
            if dir.is_dir() {
                fs::remove_dir_all(&dir).map_err(|e| io_err("remove", &dir, e))?;
                tracing::debug!("Removed {}", dir);
                report.removed_dirs += 1;
            }
        }
        Ok(())
    }

    /// Copy the Steam app id next to the game binary and install the crash reporter.
    pub fn install_side_files(
        &self,
        build_dir: &Utf8Path,
        layout: &ProjectLayout,
        report: &mut ArtifactReport,
    ) -> Result<(), ArtifactError> {
        let engine_name = self.platform.engine_name();

        let app_id = layout.steam_app_id_file();
        if app_id.is_file() {
            let binaries_dir = build_dir
                .join(&self.project_name)
                .join("Binaries")
                .join(engine_name);
            fs::create_dir_all(&binaries_dir).map_err(|e| io_err("create", &binaries_dir, e))?;
            fs::copy(&app_id, binaries_dir.join("steam_appid.txt"))
                .map_err(|e| io_err("copy", &app_id, e))?;
            report.side_files += 1;
        } else {
            tracing::warn!("{} not found, skipping Steam app id", app_id);
        }

        let crash_dir = build_dir.join("Engine").join("Binaries").join(engine_name);
        fs::create_dir_all(&crash_dir).map_err(|e| io_err("create", &crash_dir, e))?;

        let crash_reporter = layout.crash_reporter(self.platform);
        if crash_reporter.is_file() {
            let target = crash_dir.join(format!(
                "CrashReportClient{}",
                self.platform.executable_suffix()
            ));
            fs::copy(&crash_reporter, &target).map_err(|e| io_err("copy", &crash_reporter, e))?;
            report.side_files += 1;
        } else {
            tracing::debug!("No crash reporter at {}", crash_reporter);
        }

        Ok(())
    }

    fn ensure_release_dir(&self) -> Result<(), ArtifactError> {
        fs::create_dir_all(&self.release_dir).map_err(|e| io_err("create", &self.release_dir, e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Kept,
    Consumed,
}

/// Regular files under `root`, sorted, collected before anything is renamed
fn collect_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ArtifactError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| ArtifactError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => files.push(path),
            Err(path) => tracing::warn!("Skipping non UTF-8 path {}", path.display()),
        }
    }
    Ok(files)
}

fn is_third_party(file: &Utf8Path, build_dir: &Utf8Path) -> bool {
    file.strip_prefix(build_dir)
        .unwrap_or(file)
        .components()
        .any(|c| c.as_str() == THIRD_PARTY_DIR)
}

/// Move without overwriting; falls back to copy + delete across filesystems
fn move_file(from: &Utf8Path, to: &Utf8Path) -> Result<(), ArtifactError> {
    if to.exists() {
        return Err(ArtifactError::DestinationExists {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }

    if fs::rename(from, to).is_err() {
        fs::copy(from, to).map_err(|e| io_err("copy", from, e))?;
        fs::remove_file(from).map_err(|e| io_err("delete", from, e))?;
    }
    tracing::debug!("Moved {} -> {}", from, to);
    Ok(())
}
