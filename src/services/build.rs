use super::artifacts::{ArtifactPostProcessor, ArtifactReport};
use super::command::CommandComposer;
use super::preconditions::{resolve_engine_dir, resolve_output_dir, Environment};
use super::process::CommandRunner;
use super::version::query_version_tag;
use crate::models::{EngineProfile, Platform, ProjectConfig, ProjectLayout};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Result of a full build run
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub version_tag: String,
    pub release_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub platforms: Vec<(Platform, ArtifactReport)>,
}

/// Build, cook, package and post-process every configured platform.
///
/// Platforms are built strictly in configured order; the first failure aborts
/// the remaining ones. All preconditions are checked before the first external
/// process (the version tag query) runs.
pub struct BuildPipeline<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a ProjectConfig,
    layout: ProjectLayout,
    composer: CommandComposer,
    profile: EngineProfile,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        config: &'a ProjectConfig,
        project_root: &Utf8Path,
    ) -> Self {
        let layout = ProjectLayout::new(project_root, &config.name);
        let profile = EngineProfile::for_version(config.engine_version);
        Self {
            runner,
            config,
            composer: CommandComposer::new(layout.clone(), profile),
            layout,
            profile,
        }
    }

    pub async fn run(&self, env: &Environment, output_arg: Option<&str>) -> Result<BuildSummary> {
        let engine_dir = resolve_engine_dir(self.config.engine_dir.as_deref(), &self.profile, env)?;
        let output_dir = resolve_output_dir(self.config.output_dir.as_deref(), output_arg, env)?;

        let version_tag = query_version_tag(self.runner, self.layout.root()).await?;

        let release_dir = self.layout.release_dir(&version_tag);
        remove_dir_if_exists(&release_dir)?;

        tracing::info!(
            "Building {} {} for {} platform(s) into {}",
            self.config.name,
            version_tag,
            self.config.platforms.len(),
            output_dir
        );

        let mut reports = Vec::with_capacity(self.config.platforms.len());
        for &platform in &self.config.platforms {
            let report = self
                .build_platform(platform, &engine_dir, &output_dir, &release_dir, &version_tag)
                .await
                .with_context(|| format!("{} build failed", platform))?;
            reports.push((platform, report));
        }

        tracing::info!("Release {} complete: {}", version_tag, release_dir);
        Ok(BuildSummary {
            version_tag,
            release_dir,
            output_dir,
            platforms: reports,
        })
    }

    async fn build_platform(
        &self,
        platform: Platform,
        engine_dir: &Utf8Path,
        output_dir: &Utf8Path,
        release_dir: &Utf8Path,
        version_tag: &str,
    ) -> Result<ArtifactReport> {
        tracing::info!("=== Building {} ===", platform);

        let build_dir = output_dir.join(self.profile.archive_dir_name(platform));
        remove_dir_if_exists(&build_dir)?;

        let release_platform_dir = release_dir.join(platform.release_name());
        fs::create_dir_all(&release_platform_dir).with_context(|| {
            format!("Failed to create release directory: {}", release_platform_dir)
        })?;

        let command =
            self.composer
                .build_cook_run(self.config, engine_dir, platform, version_tag, output_dir);
        self.runner.run(&command).await?;

        let processor = ArtifactPostProcessor::new(
            &self.config.name,
            platform,
            self.config.keep_debug_symbols,
            release_platform_dir,
        );
        let report = processor.process(&build_dir, &self.layout)?;
        Ok(report)
    }
}

fn remove_dir_if_exists(dir: &Utf8Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).with_context(|| format!("Failed to remove {}", dir))?;
        tracing::debug!("Removed previous output {}", dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildConfiguration, EngineVersion};
    use crate::services::process::MockCommandRunner;
    use crate::services::ProcessError;
    use tempfile::TempDir;

    fn config(engine_dir: Option<Utf8PathBuf>) -> ProjectConfig {
        ProjectConfig {
            name: "Nova".to_string(),
            platforms: [Platform::Windows, Platform::Linux].into_iter().collect(),
            configuration: BuildConfiguration::Development,
            keep_debug_symbols: true,
            output_dir: None,
            engine_dir,
            source_engine: false,
            engine_version: EngineVersion::Ue5,
            itch: None,
            steam: None,
        }
    }

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, root)
    }

    #[tokio::test]
    async fn test_no_process_without_output_dir() {
        let (_guard, root) = temp_root();
        let config = config(Some(root.clone()));
        // No expectations: any call panics
        let runner = MockCommandRunner::new();

        let pipeline = BuildPipeline::new(&runner, &config, &root);
        let err = pipeline
            .run(&Environment::new(&root), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Output directory"));
    }

    #[tokio::test]
    async fn test_no_process_without_engine_dir() {
        let (_guard, root) = temp_root();
        let config = config(Some(root.join("missing-engine")));
        let runner = MockCommandRunner::new();

        let pipeline = BuildPipeline::new(&runner, &config, &root);
        let err = pipeline
            .run(&Environment::new(&root), Some("out"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_failed_platform_aborts_run() {
        let (_guard, root) = temp_root();
        let config = config(Some(root.clone()));

        let mut runner = MockCommandRunner::new();
        runner
            .expect_capture()
            .returning(|_| Ok("v1.0.0".to_string()));
        runner.expect_run().times(1).returning(|cmd| {
            Err(ProcessError::ExternalProcess {
                command: cmd.to_string(),
                status: "exit status: 1".to_string(),
            })
        });

        let pipeline = BuildPipeline::new(&runner, &config, &root);
        let err = pipeline
            .run(&Environment::new(&root), Some("out"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Windows build failed"));
    }
}
