use super::command::CommandComposer;
use super::preconditions::{resolve_engine_dir, Environment};
use super::process::{CommandRunner, ToolCommand};
use crate::models::{EngineProfile, ProjectConfig, ProjectLayout};
use anyhow::Result;
use camino::Utf8Path;

/// Argument that starts the game as a listen server
pub const HOST_MODE_ARG: &str = "host";

/// Parse the optional launch mode argument
pub fn is_host_mode(mode: Option<&str>) -> bool {
    match mode {
        Some(HOST_MODE_ARG) => true,
        Some(other) => {
            tracing::warn!("Ignoring unknown launch mode '{}'", other);
            false
        }
        None => false,
    }
}

/// Start the game locally through the editor and return without waiting.
///
/// Returns the command that was launched.
pub fn launch_game(
    runner: &dyn CommandRunner,
    config: &ProjectConfig,
    project_root: &Utf8Path,
    env: &Environment,
    mode: Option<&str>,
) -> Result<ToolCommand> {
    let profile = EngineProfile::for_version(config.engine_version);
    let engine_dir = resolve_engine_dir(config.engine_dir.as_deref(), &profile, env)?;

    let composer = CommandComposer::new(ProjectLayout::new(project_root, &config.name), profile);
    let command = composer.launch_game(&engine_dir, is_host_mode(mode));

    runner.spawn_detached(&command)?;
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildConfiguration, EngineVersion, Platform};
    use crate::services::process::MockCommandRunner;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_host_mode_argument() {
        assert!(is_host_mode(Some("host")));
        assert!(!is_host_mode(Some("client")));
        assert!(!is_host_mode(None));
    }

    #[test]
    fn test_launch_spawns_detached() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        let config = ProjectConfig {
            name: "Nova".to_string(),
            platforms: [Platform::Windows].into_iter().collect(),
            configuration: BuildConfiguration::Development,
            keep_debug_symbols: true,
            output_dir: None,
            engine_dir: None,
            source_engine: false,
            engine_version: EngineVersion::Ue4,
            itch: None,
            steam: None,
        };
        let env = Environment::new("/").with_var("UE4_ROOT", engine.as_str());

        let mut runner = MockCommandRunner::new();
        runner
            .expect_spawn_detached()
            .withf(|cmd| cmd.has_arg("-host") && cmd.has_arg("-game"))
            .times(1)
            .returning(|_| Ok(()));

        let command = launch_game(&runner, &config, Utf8Path::new("/work/Nova"), &env, Some("host"))
            .unwrap();
        assert!(command.program.as_str().contains("UE4Editor"));
    }
}
