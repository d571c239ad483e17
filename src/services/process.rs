use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::process::Command;

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

/// An external tool invocation: program, ordered arguments, optional working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: Utf8PathBuf,
    pub args: Vec<String>,
    pub current_dir: Option<Utf8PathBuf>,
}

impl ToolCommand {
    pub fn new<P: AsRef<Utf8Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir<P: AsRef<Utf8Path>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// True if any argument equals `arg`
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    fn to_tokio(&self) -> Command {
        let mut cmd = Command::new(self.program.as_std_path());
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir.as_std_path());
        }
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(self.program.as_str()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(token: &str) -> String {
    if token.contains(' ') {
        format!("\"{}\"", token)
    } else {
        token.to_string()
    }
}

/// Errors raised while running external tools
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Command failed with {status}: {command}")]
    ExternalProcess { command: String, status: String },

    #[error("Output of {command} is not valid UTF-8")]
    InvalidOutput { command: String },
}

impl ProcessError {
    fn spawn(command: &ToolCommand, source: std::io::Error) -> Self {
        ProcessError::Spawn {
            program: command.program.clone(),
            source,
        }
    }
}

/// Seam between the release workflows and the operating system.
///
/// Workflows only ever talk to external tools through this trait, so tests can
/// record invocations instead of running the engine toolchain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion; a non-zero exit is an error
    async fn run(&self, command: &ToolCommand) -> Result<(), ProcessError>;

    /// Run to completion and return trimmed stdout
    async fn capture(&self, command: &ToolCommand) -> Result<String, ProcessError>;

    /// Start without waiting and without inheriting stdio
    fn spawn_detached(&self, command: &ToolCommand) -> Result<(), ProcessError>;
}

/// [`CommandRunner`] backed by real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        tracing::info!("Executing: {}", command);
        let start = Instant::now();

        let status = command
            .to_tokio()
            .status()
            .await
            .map_err(|e| ProcessError::spawn(command, e))?;

        tracing::info!(
            "{} completed in {:.2}s with {}",
            command.program,
            start.elapsed().as_secs_f32(),
            status
        );

        if !status.success() {
            return Err(ProcessError::ExternalProcess {
                command: command.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    async fn capture(&self, command: &ToolCommand) -> Result<String, ProcessError> {
        tracing::debug!("Capturing: {}", command);

        let output = command
            .to_tokio()
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| ProcessError::spawn(command, e))?;

        if !output.status.success() {
            return Err(ProcessError::ExternalProcess {
                command: command.to_string(),
                status: output.status.to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| ProcessError::InvalidOutput {
            command: command.to_string(),
        })?;
        Ok(stdout.trim().to_string())
    }

    fn spawn_detached(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        tracing::info!("Launching detached: {}", command);

        let mut cmd = std::process::Command::new(command.program.as_std_path());
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir.as_std_path());
        }
        configure_detached(&mut cmd);

        let child = cmd.spawn().map_err(|e| ProcessError::spawn(command, e))?;
        tracing::info!("Started process {}", child.id());
        Ok(())
    }
}

fn configure_detached(cmd: &mut std::process::Command) {
    #[cfg(target_os = "windows")]
    {
        const DETACHED_PROCESS: u32 = 0x00000008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}
