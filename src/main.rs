//! Shipwright - release tooling for Unreal Engine game projects
//!
//! Main entry point for the command-line tool.
//!
//! # Overview
//!
//! One subcommand per release task:
//! - `build [OUTPUT_DIR]`: BuildCookRun every platform, then post-process the packaged output
//! - `format`: clang-format every C++ source under `Source/`
//! - `launch [host]`: start the game through the editor and return immediately
//! - `upload-itch [OUTPUT_DIR]`: butler push per configured itch.io channel
//! - `upload-steam`: steamcmd app build per configured manifest
//!
//! # Execution Flow
//!
//! 1. Parse the command line
//! 2. Initialize logging → `<log-dir>/shipwright.<date>` plus console
//! 3. Create a current-thread tokio runtime (every external tool runs sequentially)
//! 4. Load `<project-root>/Config/Build.json`
//! 5. Run the subcommand; any error is printed and the process exits non-zero

use anyhow::Result;
use clap::Parser;
use shipwright::cli::{self, Cli};
use shipwright::services::{Environment, SystemRunner};
use shipwright::{APP_NAME, VERSION};

fn main() -> Result<()> {
    let args = Cli::parse();
    let env = Environment::from_process()?;

    // Guard flushes the file appender on exit
    let _guard = shipwright::logging::setup_logging(&cli::log_dir(&args, &env), APP_NAME, args.debug, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let runner = SystemRunner::new();
    let result = runtime.block_on(cli::execute(&args, &runner, &env));

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
