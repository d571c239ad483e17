use super::preconditions::SteamEnvironment;
use super::process::ToolCommand;
use crate::models::{EngineProfile, ItchChannel, ItchConfig, Platform, ProjectConfig, ProjectLayout};
use camino::Utf8Path;

/// Window placement used when launching the game locally
const LAUNCH_WINDOW_ARGS: [&str; 4] = ["-ResX=1920", "-ResY=1040", "-WinX=1920", "-WinY=30"];

/// Builds command lines for every external tool the release workflows call.
///
/// All methods are pure: they only assemble argument lists from already
/// validated inputs.
#[derive(Debug, Clone)]
pub struct CommandComposer {
    layout: ProjectLayout,
    profile: EngineProfile,
    host: Platform,
}

impl CommandComposer {
    pub fn new(layout: ProjectLayout, profile: EngineProfile) -> Self {
        Self::with_host(layout, profile, Platform::host())
    }

    /// Composer for an explicit host platform
    pub fn with_host(layout: ProjectLayout, profile: EngineProfile, host: Platform) -> Self {
        Self {
            layout,
            profile,
            host,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// RunUAT BuildCookRun invocation for one target platform
    pub fn build_cook_run(
        &self,
        config: &ProjectConfig,
        engine_dir: &Utf8Path,
        platform: Platform,
        version_tag: &str,
        output_dir: &Utf8Path,
    ) -> ToolCommand {
        let project_file = self.layout.project_file();
        let target = platform.engine_name();

        let mut command = ToolCommand::new(self.profile.automation_tool(engine_dir, self.host))
            // SDK
            .arg(format!("-ScriptsForProject={}", project_file))
            .args(["Turnkey", "-command=VerifySdk"])
            .arg(format!("-platform={}", target))
            .arg("-UpdateIfNeeded")
            // Executable
            .arg("BuildCookRun")
            .arg(format!("-unrealexe={}", self.profile.editor_cmd_name(self.host)))
            // Project
            .arg(format!("-project={}", project_file))
            .args(["-utf8output", "-nop4"])
            // Build
            .arg("-nocompile")
            .arg(format!("-clientconfig={}", config.configuration))
            .arg("-build")
            .arg(format!("-targetplatform={}", target));

        if !config.source_engine {
            command = command.arg("-installed");
        }

        command
            // Cook
            .args(["-cook", "-skipcookingeditorcontent"])
            .arg(format!("-createreleaseversion={}", version_tag))
            // Package
            .args([
                "-stage",
                "-package",
                "-pak",
                "-compressed",
                "-distribution",
                "-archive",
            ])
            .arg(format!("-archivedirectory={}", output_dir))
    }

    /// In-place clang-format of one source file, using the repository's .clang-format
    pub fn clang_format(&self, file: &Utf8Path) -> ToolCommand {
        ToolCommand::new("clang-format")
            .args(["-i", "-style=file"])
            .arg(file.as_str())
    }

    /// Editor started in game mode on the local machine
    pub fn launch_game(&self, engine_dir: &Utf8Path, host_mode: bool) -> ToolCommand {
        let mut command = ToolCommand::new(self.profile.editor_executable(engine_dir, self.host))
            .arg(self.layout.project_file().as_str())
            .args(["-skipcompile", "-game"])
            .args(LAUNCH_WINDOW_ARGS);

        if host_mode {
            command = command.arg("-host");
        }
        command
    }

    /// `butler push <output>/<directory> <user>/<project>:<branch>`
    pub fn butler_push(
        &self,
        itch: &ItchConfig,
        channel: &ItchChannel,
        output_dir: &Utf8Path,
    ) -> ToolCommand {
        ToolCommand::new("butler")
            .arg("push")
            .arg(output_dir.join(&channel.directory).as_str())
            .arg(itch.target(&channel.branch))
    }

    /// steamcmd app build for one manifest, run from the SDK builder folder
    pub fn steam_app_build(&self, steam: &SteamEnvironment, manifest: &Utf8Path) -> ToolCommand {
        ToolCommand::new(steam.steamcmd())
            .args(["+login", steam.user.as_str()])
            .args(["+run_app_build", manifest.as_str()])
            .arg("+quit")
            .current_dir(&steam.builder_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildConfiguration, EngineVersion};
    use camino::Utf8PathBuf;

    fn config(source_engine: bool) -> ProjectConfig {
        ProjectConfig {
            name: "Nova".to_string(),
            platforms: [Platform::Windows, Platform::Linux].into_iter().collect(),
            configuration: BuildConfiguration::Shipping,
            keep_debug_symbols: false,
            output_dir: None,
            engine_dir: None,
            source_engine,
            engine_version: EngineVersion::Ue5,
            itch: None,
            steam: None,
        }
    }

    fn composer(host: Platform) -> CommandComposer {
        CommandComposer::with_host(
            ProjectLayout::new("/work/Nova", "Nova"),
            EngineProfile::default(),
            host,
        )
    }

    #[test]
    fn test_build_cook_run_installed_engine() {
        let cmd = composer(Platform::Windows).build_cook_run(
            &config(false),
            Utf8Path::new("/engine"),
            Platform::Linux,
            "v1.0.0",
            Utf8Path::new("/out"),
        );

        assert_eq!(
            cmd.program,
            Utf8PathBuf::from("/engine/Engine/Build/BatchFiles/RunUAT.bat")
        );
        assert!(cmd.has_arg("BuildCookRun"));
        assert!(cmd.has_arg("-installed"));
        assert!(cmd.has_arg("-targetplatform=Linux"));
        assert!(cmd.has_arg("-platform=Linux"));
        assert!(cmd.has_arg("-clientconfig=Shipping"));
        assert!(cmd.has_arg("-createreleaseversion=v1.0.0"));
        assert!(cmd.has_arg("-archivedirectory=/out"));
        assert!(cmd.has_arg("-project=/work/Nova/Nova.uproject"));
        assert!(cmd.has_arg("-unrealexe=UnrealEditor-Cmd.exe"));
        assert!(!cmd.args.iter().any(String::is_empty));
    }

    #[test]
    fn test_build_cook_run_source_engine() {
        let cmd = composer(Platform::Linux).build_cook_run(
            &config(true),
            Utf8Path::new("/engine"),
            Platform::Windows,
            "v1.0.0",
            Utf8Path::new("/out"),
        );

        assert!(!cmd.has_arg("-installed"));
        assert!(cmd.has_arg("-targetplatform=Win64"));
        assert!(cmd.program.as_str().ends_with("RunUAT.sh"));
    }

    #[test]
    fn test_build_cook_run_phase_order() {
        let cmd = composer(Platform::Windows).build_cook_run(
            &config(false),
            Utf8Path::new("/engine"),
            Platform::Windows,
            "v1",
            Utf8Path::new("/out"),
        );

        let position = |arg: &str| cmd.args.iter().position(|a| a == arg).unwrap();
        assert!(position("Turnkey") < position("BuildCookRun"));
        assert!(position("-build") < position("-cook"));
        assert!(position("-cook") < position("-stage"));
        assert!(position("-package") < position("-archive"));
    }

    #[test]
    fn test_launch_game_host_mode() {
        let composer = composer(Platform::Windows);

        let cmd = composer.launch_game(Utf8Path::new("/engine"), true);
        assert_eq!(
            cmd.program,
            Utf8PathBuf::from("/engine/Engine/Binaries/Win64/UnrealEditor.exe")
        );
        assert_eq!(cmd.args[0], "/work/Nova/Nova.uproject");
        assert!(cmd.has_arg("-game"));
        assert!(cmd.has_arg("-host"));

        let cmd = composer.launch_game(Utf8Path::new("/engine"), false);
        assert!(!cmd.has_arg("-host"));
    }

    #[test]
    fn test_clang_format() {
        let cmd = composer(Platform::Linux).clang_format(Utf8Path::new("/work/Nova/Source/Nova.cpp"));
        assert_eq!(cmd.program, Utf8PathBuf::from("clang-format"));
        assert_eq!(cmd.args, vec!["-i", "-style=file", "/work/Nova/Source/Nova.cpp"]);
    }

    #[test]
    fn test_butler_push() {
        let itch = ItchConfig {
            user: "studio".to_string(),
            project: "nova".to_string(),
            branches: vec!["linux".to_string()],
            directories: vec!["Linux".to_string()],
        };
        let channel = &itch.channels()[0];

        let cmd = composer(Platform::Linux).butler_push(&itch, channel, Utf8Path::new("/out"));
        assert_eq!(cmd.args, vec!["push", "/out/Linux", "studio/nova:linux"]);
    }

    #[test]
    fn test_steam_app_build() {
        let steam = SteamEnvironment {
            user: "account".to_string(),
            builder_dir: Utf8PathBuf::from("/sdk/builder_linux"),
        };

        let cmd = composer(Platform::Linux)
            .steam_app_build(&steam, Utf8Path::new("/work/Nova/Config/app_build.vdf"));
        assert_eq!(cmd.program, Utf8PathBuf::from("/sdk/builder_linux/steamcmd.sh"));
        assert_eq!(
            cmd.args,
            vec![
                "+login",
                "account",
                "+run_app_build",
                "/work/Nova/Config/app_build.vdf",
                "+quit"
            ]
        );
        assert_eq!(cmd.current_dir, Some(Utf8PathBuf::from("/sdk/builder_linux")));
    }
}
