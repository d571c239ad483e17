//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use shipwright::services::{CommandRunner, ProcessError, ToolCommand};
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

type RunHook = Box<dyn Fn(&ToolCommand) + Send + Sync>;

/// CommandRunner that records every invocation instead of running it
pub struct RecordingRunner {
    pub version_tag: String,
    pub fail_program_containing: Option<String>,
    on_run: Option<RunHook>,
    calls: Mutex<Vec<ToolCommand>>,
    detached: Mutex<Vec<ToolCommand>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            version_tag: "v1.2.0".to_string(),
            fail_program_containing: None,
            on_run: None,
            calls: Mutex::new(Vec::new()),
            detached: Mutex::new(Vec::new()),
        }
    }

    /// Fail any command whose program path contains `needle`
    pub fn failing(mut self, needle: &str) -> Self {
        self.fail_program_containing = Some(needle.to_string());
        self
    }

    /// Side effect executed for every successful `run`
    pub fn on_run(mut self, hook: impl Fn(&ToolCommand) + Send + Sync + 'static) -> Self {
        self.on_run = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn detached(&self) -> Vec<ToolCommand> {
        self.detached.lock().unwrap().clone()
    }

    fn record(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        self.calls.lock().unwrap().push(command.clone());
        match &self.fail_program_containing {
            Some(needle) if command.program.as_str().contains(needle.as_str()) => {
                Err(ProcessError::ExternalProcess {
                    command: command.to_string(),
                    status: "exit status: 1".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        self.record(command)?;
        if let Some(hook) = &self.on_run {
            hook(command);
        }
        Ok(())
    }

    async fn capture(&self, command: &ToolCommand) -> Result<String, ProcessError> {
        self.record(command)?;
        Ok(self.version_tag.clone())
    }

    fn spawn_detached(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        self.detached.lock().unwrap().push(command.clone());
        Ok(())
    }
}

pub fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

pub fn write_file(path: &Utf8Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Write `<root>/Config/Build.json`
pub fn write_build_json(root: &Utf8Path, json: &str) {
    write_file(&root.join("Config").join("Build.json"), json);
}

/// Every file under `root` as (relative path, contents), sorted
pub fn snapshot(root: &Utf8Path) -> Vec<(String, String)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let path = Utf8PathBuf::try_from(e.into_path()).unwrap();
            let relative = path.strip_prefix(root).unwrap().as_str().replace('\\', "/");
            (relative, fs::read_to_string(&path).unwrap_or_default())
        })
        .collect();
    files.sort();
    files
}

/// Populate `<output>/<platform>` the way an archived BuildCookRun would
pub fn fake_packaged_build(build_dir: &Utf8Path, project: &str, engine_platform: &str) {
    let binaries = build_dir.join(project).join("Binaries").join(engine_platform);
    let paks = build_dir.join(project).join("Content").join("Paks");

    write_file(&binaries.join(format!("{}-{}-Shipping.exe", project, engine_platform)), "exe");
    write_file(&binaries.join(format!("{}-{}-Shipping.pdb", project, engine_platform)), "pdb");
    write_file(&build_dir.join(format!("{}.exe", project)), "bootstrap");
    write_file(
        &build_dir
            .join("Engine")
            .join("Binaries")
            .join("ThirdParty")
            .join("Ogg")
            .join("libogg.pdb"),
        "ogg",
    );
    write_file(&paks.join("pakchunk0-Windows.pak"), "chunk0");
    write_file(&paks.join("pakchunk1optional-Windows.pak"), "chunk1b");
    write_file(&paks.join("pakchunk0-Windows.utoc"), "toc");
    write_file(&build_dir.join("Manifest_UFSFiles_Win64.txt"), "manifest");
    write_file(&build_dir.join("Manifest_NonUFSFiles_Win64.txt"), "manifest");
    write_file(&build_dir.join(project).join("Config").join("DefaultGame.ini"), "ini");
    write_file(&build_dir.join("Engine").join("Content").join("Slate").join("x.png"), "png");
    write_file(
        &build_dir
            .join("Engine")
            .join("Binaries")
            .join("ThirdParty")
            .join("PhysX3")
            .join("PhysX3.dll"),
        "dll",
    );
    write_file(
        &build_dir
            .join("Engine")
            .join("Binaries")
            .join("ThirdParty")
            .join("NVIDIA")
            .join("GeForceNOW")
            .join("GfnRuntimeSdk.dll"),
        "dll",
    );
}
