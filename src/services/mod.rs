//! Services module - release workflows for the game project.
//!
//! Every workflow follows the same shape: validate preconditions, compose a
//! command line, hand it to a [`CommandRunner`], then optionally touch the
//! filesystem. The services have no knowledge of the CLI layer.
//!
//! # Components
//!
//! - [`preconditions`]: engine/output directory and Steam environment resolution
//! - [`CommandComposer`]: argument lists for RunUAT, clang-format, the editor, butler and steamcmd
//! - [`CommandRunner`]: process seam; [`SystemRunner`] is the real implementation
//! - [`ArtifactPostProcessor`]: filename rule table applied to packaged builds
//! - [`BuildPipeline`]: version tag, per-platform BuildCookRun and post-processing
//! - [`SourceFormatter`], [`launch_game`], [`upload_itch`], [`upload_steam`]: the remaining workflows
//!
//! # Usage Example
//!
//! ```ignore
//! use shipwright::services::{BuildPipeline, Environment, SystemRunner};
//!
//! let runner = SystemRunner::new();
//! let env = Environment::from_process()?;
//! let summary = BuildPipeline::new(&runner, &config, project_root)
//!     .run(&env, Some("D:/Builds"))
//!     .await?;
//! ```

pub mod artifacts;
pub mod build;
pub mod command;
pub mod format;
pub mod launch;
pub mod preconditions;
pub mod process;
pub mod upload;
pub mod version;

pub use artifacts::{ArtifactError, ArtifactPostProcessor, ArtifactReport, RuleAction};
pub use build::{BuildPipeline, BuildSummary};
pub use command::CommandComposer;
pub use format::SourceFormatter;
pub use launch::launch_game;
pub use preconditions::{Environment, PreconditionError, SteamEnvironment};
pub use process::{CommandRunner, ProcessError, SystemRunner, ToolCommand};
pub use upload::{upload_itch, upload_steam};
pub use version::{query_version_tag, VersionTagError};
