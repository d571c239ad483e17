use super::command::CommandComposer;
use super::process::CommandRunner;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use walkdir::WalkDir;

/// Runs clang-format over the C++ sources of a project
pub struct SourceFormatter<'a> {
    runner: &'a dyn CommandRunner,
    composer: &'a CommandComposer,
    source_pattern: Regex,
}

impl<'a> SourceFormatter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, composer: &'a CommandComposer) -> Self {
        Self {
            runner,
            composer,
            source_pattern: Regex::new(r"\.(h|c|cpp)$").expect("Invalid source regex"),
        }
    }

    /// Source files under `source_dir`, in sorted path order
    pub fn collect_sources(&self, source_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        let mut sources = Vec::new();
        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", source_dir))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                tracing::warn!("Skipping non UTF-8 path {}", entry.path().display());
                continue;
            };
            if path
                .file_name()
                .is_some_and(|name| self.source_pattern.is_match(name))
            {
                sources.push(path.to_path_buf());
            }
        }
        Ok(sources)
    }

    /// Format every source file in place, stopping at the first failure.
    ///
    /// Returns the number of files formatted.
    pub async fn format_all(&self, source_dir: &Utf8Path) -> Result<usize> {
        let sources = self.collect_sources(source_dir)?;
        tracing::info!("Formatting {} source files under {}", sources.len(), source_dir);

        for source in &sources {
            let command = self.composer.clang_format(source);
            self.runner
                .run(&command)
                .await
                .with_context(|| format!("Failed to format {}", source))?;
        }

        Ok(sources.len())
    }
}
