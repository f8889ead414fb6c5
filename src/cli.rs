//! Command handler for the covdelta CLI.
//!
//! `cmd_report` returns its output as a `String`, making it easy to test
//! without capturing stdout.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::format::OutputFormat;
use crate::report::Report;
use crate::{changed_files, ingest};

/// Everything that controls a report run besides the three input files.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Import path of the tested repository, prefixed to every changed file.
    pub root: String,
    /// Sub-path of the repository removed from every changed file.
    pub project_path: String,
    /// Prefix trimmed from every displayed path.
    pub trim: Option<String>,
    pub format: OutputFormat,
    /// Files matching this pattern are ignored in both profiles.
    pub exclude: Option<Regex>,
}

impl Config {
    /// Compile and set the exclusion pattern.
    pub fn set_exclude(&mut self, pattern: &str) -> crate::error::Result<()> {
        self.exclude = Some(Regex::new(pattern)?);
        Ok(())
    }
}

/// Compare the old and new coverage profiles for the listed changed files.
///
/// Returns `None` when there are no changed files to report on.
pub fn cmd_report(
    old_coverage: &Path,
    new_coverage: &Path,
    changed_files_path: &Path,
    config: &Config,
) -> Result<Option<String>> {
    let old = ingest::load_coverage(old_coverage, config.exclude.as_ref())
        .context("failed to parse old coverage")?;
    let new = ingest::load_coverage(new_coverage, config.exclude.as_ref())
        .context("failed to parse new coverage")?;

    let changed = changed_files::load(changed_files_path, &config.root, &config.project_path)
        .context("failed to load changed files")?;

    if changed.is_empty() {
        log::warn!("Skipping report since there are no changed files");
        return Ok(None);
    }

    let mut report = Report::new(old, new, changed);
    if let Some(prefix) = config.trim.as_deref().filter(|p| !p.is_empty()) {
        report.trim_prefix(prefix);
    }

    let output = report
        .format(config.format.formatter())
        .with_context(|| format!("failed to render {} report", config.format))?;
    Ok(Some(output))
}
