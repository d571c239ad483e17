use super::process::{CommandRunner, ProcessError, ToolCommand};
use camino::Utf8Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VersionTagError {
    #[error("git describe failed: {0}")]
    Query(#[source] ProcessError),

    #[error("git describe returned an empty tag")]
    Empty,
}

/// `git describe --tags`, run inside the project checkout
pub fn describe_command(repo_dir: &Utf8Path) -> ToolCommand {
    ToolCommand::new("git")
        .args(["describe", "--tags"])
        .current_dir(repo_dir)
}

/// Query the release version tag from source control.
pub async fn query_version_tag(
    runner: &dyn CommandRunner,
    repo_dir: &Utf8Path,
) -> Result<String, VersionTagError> {
    let tag = runner
        .capture(&describe_command(repo_dir))
        .await
        .map_err(VersionTagError::Query)?;

    let tag = tag.lines().next().unwrap_or_default().trim().to_string();
    if tag.is_empty() {
        return Err(VersionTagError::Empty);
    }

    tracing::info!("Release version: {}", tag);
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::process::MockCommandRunner;

    #[tokio::test]
    async fn test_query_version_tag() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_capture()
            .withf(|cmd| cmd.program == "git" && cmd.args == ["describe", "--tags"])
            .times(1)
            .returning(|_| Ok("v0.4.1-12-gdeadbee\n".to_string()));

        let tag = query_version_tag(&runner, Utf8Path::new("/work/Nova"))
            .await
            .unwrap();
        assert_eq!(tag, "v0.4.1-12-gdeadbee");
    }

    #[tokio::test]
    async fn test_query_failure_is_version_error() {
        let mut runner = MockCommandRunner::new();
        runner.expect_capture().returning(|_| {
            Err(ProcessError::ExternalProcess {
                command: "git describe --tags".to_string(),
                status: "exit status: 128".to_string(),
            })
        });

        let err = query_version_tag(&runner, Utf8Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, VersionTagError::Query(_)));
    }

    #[tokio::test]
    async fn test_empty_tag_rejected() {
        let mut runner = MockCommandRunner::new();
        runner.expect_capture().returning(|_| Ok(String::new()));

        let err = query_version_tag(&runner, Utf8Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, VersionTagError::Empty));
    }
}
