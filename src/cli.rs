//! Command-line surface and subcommand dispatch.

use crate::config::ConfigManager;
use crate::models::{EngineProfile, ProjectLayout};
use crate::services::{
    self, BuildPipeline, CommandComposer, CommandRunner, Environment, SourceFormatter,
};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "shipwright",
    version,
    about = "Build, package, launch and upload an Unreal Engine game"
)]
pub struct Cli {
    /// Game project root (folder holding the .uproject)
    #[arg(long, default_value = "..")]
    pub project_root: Utf8PathBuf,

    /// Build.json to use instead of <project-root>/Config/Build.json
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    pub log_dir: Utf8PathBuf,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Build, cook and package every configured platform
    Build {
        /// Output directory, when Build.json has no outputDir
        output_dir: Option<String>,
    },
    /// Run clang-format over Source/
    Format,
    /// Start the game locally without waiting for it
    Launch {
        /// Pass "host" to start as a listen server
        mode: Option<String>,
    },
    /// Push packaged builds to itch.io with butler
    UploadItch {
        /// Output directory, when Build.json has no outputDir
        output_dir: Option<String>,
    },
    /// Run Steam app builds with steamcmd
    UploadSteam {
        /// Accepted for symmetry with the other uploaders; steamcmd reads paths from the manifests
        output_dir: Option<String>,
    },
}

impl Cli {
    pub fn config_manager(&self, env: &Environment) -> ConfigManager {
        match &self.config {
            Some(path) => ConfigManager::new(env.absolute(path)),
            None => ConfigManager::for_project_root(self.project_root(env)),
        }
    }

    /// Absolute project root
    pub fn project_root(&self, env: &Environment) -> Utf8PathBuf {
        env.absolute(&self.project_root)
    }
}

/// Run the selected subcommand to completion.
pub async fn execute(cli: &Cli, runner: &dyn CommandRunner, env: &Environment) -> Result<()> {
    let project_root = cli.project_root(env);
    let config_manager = cli.config_manager(env);
    let config = config_manager
        .load()
        .with_context(|| format!("Failed to load {}", config_manager.config_path()))?;

    match &cli.command {
        Command::Build { output_dir } => {
            let summary = BuildPipeline::new(runner, &config, &project_root)
                .run(env, output_dir.as_deref())
                .await?;
            for (platform, report) in &summary.platforms {
                tracing::info!("{}: {}", platform, report.summary());
            }
        }
        Command::Format => {
            let composer = CommandComposer::new(
                ProjectLayout::new(&project_root, &config.name),
                EngineProfile::for_version(config.engine_version),
            );
            let source_dir = composer.layout().source_dir();
            let count = SourceFormatter::new(runner, &composer)
                .format_all(&source_dir)
                .await?;
            tracing::info!("Formatted {} files", count);
        }
        Command::Launch { mode } => {
            services::launch_game(runner, &config, &project_root, env, mode.as_deref())?;
        }
        Command::UploadItch { output_dir } => {
            let count =
                services::upload_itch(runner, &config, &project_root, env, output_dir.as_deref())
                    .await?;
            tracing::info!("Uploaded {} itch.io channels", count);
        }
        Command::UploadSteam { output_dir } => {
            if let Some(dir) = output_dir {
                tracing::debug!("Output directory {} is not used by steamcmd", dir);
            }
            let count =
                services::upload_steam(runner, &config, &config_manager, &project_root, env)
                    .await?;
            tracing::info!("Ran {} Steam app builds", count);
        }
    }

    Ok(())
}

/// Log directory resolved against the environment's current directory
pub fn log_dir(cli: &Cli, env: &Environment) -> Utf8PathBuf {
    env.absolute(&cli.log_dir)
}
