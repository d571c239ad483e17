//! Store uploads: itch.io through butler, Steam through steamcmd.
//!
//! Each uploader runs one command per configured channel, in order, and stops
//! at the first failure. Channels uploaded before a failure stay uploaded.

use super::command::CommandComposer;
use super::preconditions::{resolve_output_dir, resolve_steam_env, Environment};
use super::process::CommandRunner;
use crate::config::{ConfigError, ConfigManager};
use crate::models::{EngineProfile, ProjectConfig, ProjectLayout};
use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;

/// Push every itch.io channel. Returns the number of channels uploaded.
pub async fn upload_itch(
    runner: &dyn CommandRunner,
    config: &ProjectConfig,
    project_root: &Utf8Path,
    env: &Environment,
    output_arg: Option<&str>,
) -> Result<usize> {
    let itch = config
        .itch
        .as_ref()
        .ok_or_else(|| anyhow!("Build.json has no itch section"))?;
    let output_dir = resolve_output_dir(config.output_dir.as_deref(), output_arg, env)?;

    let composer = composer(config, project_root);
    let channels = itch.channels();
    for channel in &channels {
        tracing::info!("Uploading {} to itch.io channel {}", channel.directory, channel.branch);
        let command = composer.butler_push(itch, channel, &output_dir);
        runner
            .run(&command)
            .await
            .with_context(|| format!("itch.io upload to {} failed", itch.target(&channel.branch)))?;
    }

    Ok(channels.len())
}

/// Run a Steam app build for every configured manifest. Returns the number of builds.
pub async fn upload_steam(
    runner: &dyn CommandRunner,
    config: &ProjectConfig,
    config_manager: &ConfigManager,
    project_root: &Utf8Path,
    env: &Environment,
) -> Result<usize> {
    let steam = config
        .steam
        .as_ref()
        .ok_or_else(|| anyhow!("Build.json has no steam section"))?;
    let steam_env = resolve_steam_env(env)?;

    let composer = composer(config, project_root);
    for app in &steam.apps {
        // Passed to steamcmd as-is: canonical Windows paths carry a \\?\ prefix
        let manifest = env.absolute(&config_manager.config_dir().join(app));
        if !manifest.is_file() {
            return Err(ConfigError::MissingManifest {
                path: config_manager.config_path().to_path_buf(),
                manifest,
            }
            .into());
        }

        tracing::info!("Running Steam app build {}", manifest);
        let command = composer.steam_app_build(&steam_env, &manifest);
        runner
            .run(&command)
            .await
            .with_context(|| format!("Steam upload of {} failed", app))?;
    }

    Ok(steam.apps.len())
}

fn composer(config: &ProjectConfig, project_root: &Utf8Path) -> CommandComposer {
    CommandComposer::new(
        ProjectLayout::new(project_root, &config.name),
        EngineProfile::for_version(config.engine_version),
    )
}
