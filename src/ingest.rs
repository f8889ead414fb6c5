use std::path::Path;

use regex::Regex;

use crate::coverage::Coverage;
use crate::error::Result;
use crate::parsers::gocover::GocoverParser;
use crate::parsers::Parser;

/// Read a coverage profile, drop every file matching `exclude`, and build a
/// snapshot from the rest.
pub fn load_coverage(file_path: &Path, exclude: Option<&Regex>) -> Result<Coverage> {
    let content = std::fs::read(file_path)?;
    let profiles = GocoverParser.parse(&content)?;
    let parsed = profiles.len();

    let mut cov = Coverage::build(profiles)?;
    if let Some(pattern) = exclude {
        cov.retain_files(|p| !pattern.is_match(&p.file_name));
    }

    log::debug!(
        "Loaded {}: {} files ({} excluded), {}/{} statements covered",
        file_path.display(),
        cov.files().len(),
        parsed - cov.files().len(),
        cov.covered_stmt(),
        cov.total_stmt(),
    );

    Ok(cov)
}
