//! Data models for shipwright.
//!
//! - [`ProjectConfig`]: Build.json contents (platforms, configuration, uploader settings)
//! - [`EngineProfile`]: executable and environment names that differ between UE4 and UE5
//! - [`ProjectLayout`]: fixed paths inside the game project checkout
//!
//! All of these are read-only inputs; nothing here is mutated after loading.

pub mod config;
pub mod engine;
pub mod project;

pub use config::{
    BuildConfiguration, EngineVersion, ItchChannel, ItchConfig, Platform, ProjectConfig,
    SteamConfig,
};
pub use engine::EngineProfile;
pub use project::ProjectLayout;
