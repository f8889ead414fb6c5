//! Coverage delta reports: compare an old and a new snapshot for the files
//! touched by a change, and render the result as Markdown or JSON.

use std::collections::BTreeSet;
use std::fmt::Write;

use serde::Serialize;

use crate::coverage::{package_of, trim_path, Coverage};
use crate::error::Result;
use crate::model::FileStats;

/// Changed files with this suffix are unit tests and are listed separately.
pub const TEST_FILE_SUFFIX: &str = "_test.go";

#[must_use]
pub fn is_test_file(name: &str) -> bool {
    name.ends_with(TEST_FILE_SUFFIX)
}

/// Round `val` to `places` decimal places, halves away from zero.
#[must_use]
pub fn round(val: f64, places: i32) -> f64 {
    let pow = 10f64.powi(places);
    (val * pow).round() / pow
}

/// How much a coverage change is worth celebrating (or mourning).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// One skull per ten lost points, capped at five.
    Skull(usize),
    ThumbsDown,
    Neutral,
    ThumbsUp,
    Tada,
    Star,
}

impl Severity {
    /// Classify a percentage point difference.
    #[must_use]
    pub fn of(diff: f64) -> Self {
        if diff < -50.0 {
            Severity::Skull(5)
        } else if diff < -10.0 {
            Severity::Skull((-diff / 10.0) as usize)
        } else if diff < 0.0 {
            Severity::ThumbsDown
        } else if diff == 0.0 {
            Severity::Neutral
        } else if diff > 20.0 {
            Severity::Star
        } else if diff > 10.0 {
            Severity::Tada
        } else {
            Severity::ThumbsUp
        }
    }

    #[must_use]
    pub fn emoji(&self) -> String {
        match self {
            Severity::Skull(n) => ":skull: ".repeat(*n),
            Severity::ThumbsDown => ":thumbsdown:".to_string(),
            Severity::Neutral => String::new(),
            Severity::ThumbsUp => ":thumbsup:".to_string(),
            Severity::Tada => ":tada:".to_string(),
            Severity::Star => ":star2:".to_string(),
        }
    }
}

/// Emoji and bold signed difference for a percentage change. No change is
/// shown as `ø`.
#[must_use]
pub fn emoji_score(new_percent: f64, old_percent: f64) -> (String, String) {
    let diff = new_percent - old_percent;
    let severity = Severity::of(diff);
    let diff_str = match severity {
        Severity::Neutral => "ø".to_string(),
        _ => format!("**{diff:+.2}%**"),
    };
    (severity.emoji(), diff_str)
}

/// `new`, annotated with how far it moved from `old`.
#[must_use]
pub fn value_with_delta(old: u64, new: u64) -> String {
    if new > old {
        format!("{new} (+{})", new - old)
    } else if new < old {
        format!("{new} (-{})", old - new)
    } else {
        new.to_string()
    }
}

/// Sorted, distinct package directories of `files`.
fn packages_of(files: &[String]) -> Vec<String> {
    files
        .iter()
        .map(|file| package_of(file).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Old and new coverage of one changed package.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageDelta<'a> {
    pub package: &'a str,
    pub old_percent: f64,
    pub new_percent: f64,
}

/// Old vs. new coverage for a set of changed files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Report {
    old: Coverage,
    new: Coverage,
    changed_files: Vec<String>,
    changed_packages: Vec<String>,
}

impl Report {
    pub fn new(old: Coverage, new: Coverage, mut changed_files: Vec<String>) -> Self {
        changed_files.sort();
        changed_files.dedup();
        let changed_packages = packages_of(&changed_files);

        Self {
            old,
            new,
            changed_files,
            changed_packages,
        }
    }

    pub fn old(&self) -> &Coverage {
        &self.old
    }

    pub fn new_coverage(&self) -> &Coverage {
        &self.new
    }

    pub fn changed_files(&self) -> &[String] {
        &self.changed_files
    }

    pub fn changed_packages(&self) -> &[String] {
        &self.changed_packages
    }

    /// Coverage of every changed package in both snapshots. A package missing
    /// from a snapshot has 0% coverage there.
    pub fn package_deltas(&self) -> Vec<PackageDelta<'_>> {
        let old_pkgs = self.old.by_package();
        let new_pkgs = self.new.by_package();

        self.changed_packages
            .iter()
            .map(|pkg| PackageDelta {
                package: pkg,
                old_percent: old_pkgs.get(pkg).map_or(0.0, Coverage::percent),
                new_percent: new_pkgs.get(pkg).map_or(0.0, Coverage::percent),
            })
            .collect()
    }

    /// Markdown headline summarizing the direction of all package changes.
    pub fn title(&self) -> String {
        let mut increased = 0;
        let mut decreased = 0;
        for delta in self.package_deltas() {
            // Compare what is displayed, not noise in the third decimal place.
            let old = round(delta.old_percent, 2);
            let new = round(delta.new_percent, 2);
            if new > old {
                increased += 1;
            } else if new < old {
                decreased += 1;
            }
        }

        match (increased, decreased) {
            (0, 0) => "### Merging this branch will **not change** overall coverage\n".to_string(),
            (_, 0) => "### Merging this branch will **increase** overall coverage\n".to_string(),
            (0, _) => "### Merging this branch will **decrease** overall coverage\n".to_string(),
            _ => format!(
                "### Merging this branch changes the coverage ({decreased} decrease, {increased} increase)\n"
            ),
        }
    }

    /// Strip `prefix` from every displayed path, including the file names of
    /// both snapshots.
    pub fn trim_prefix(&mut self, prefix: &str) {
        for file in &mut self.changed_files {
            *file = trim_path(file, prefix);
        }
        self.changed_files.sort();
        self.changed_files.dedup();
        self.changed_packages = packages_of(&self.changed_files);

        self.old.trim_prefix(prefix);
        self.new.trim_prefix(prefix);
    }

    /// Format using a specific formatter.
    pub fn format(&self, formatter: &dyn ReportFormatter) -> Result<String> {
        formatter.format(self)
    }

    pub fn markdown(&self) -> Result<String> {
        self.format(&MarkdownFormatter)
    }

    pub fn json(&self) -> Result<String> {
        self.format(&JsonFormatter)
    }
}

/// Trait for formatting coverage delta reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &Report) -> Result<String>;
}

/// Markdown formatter, suitable for a pull request comment.
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut md = String::new();

        writeln!(md, "{}", report.title())?;
        md.push_str("| Impacted Packages | Coverage Δ | :robot: |\n");
        md.push_str("|-------------------|------------|---------|\n");

        for delta in report.package_deltas() {
            let (emoji, diff) = emoji_score(delta.new_percent, delta.old_percent);
            writeln!(
                md,
                "| {} | {:.2}% ({diff}) | {emoji} |",
                delta.package, delta.new_percent
            )?;
        }

        md.push('\n');
        self.write_details(report, &mut md)?;

        Ok(md)
    }
}

impl MarkdownFormatter {
    fn write_details(&self, report: &Report, md: &mut String) -> std::fmt::Result {
        md.push_str("---\n\n<details>\n\n<summary>Coverage by file</summary>\n\n");

        let (test_files, code_files): (Vec<&String>, Vec<&String>) = report
            .changed_files
            .iter()
            .partition(|file| is_test_file(file));

        if !code_files.is_empty() {
            self.write_code_files(report, &code_files, md)?;
        }
        if !test_files.is_empty() {
            md.push_str("### Changed unit test files\n\n");
            for file in &test_files {
                writeln!(md, "- {file}")?;
            }
            md.push('\n');
        }

        md.push_str("</details>");
        Ok(())
    }

    fn write_code_files(&self, report: &Report, files: &[&String], md: &mut String) -> std::fmt::Result {
        md.push_str("### Changed files (no unit tests)\n\n");
        md.push_str("| Changed File | Coverage Δ | Total | Covered | Missed | :robot: |\n");
        md.push_str("|--------------|------------|-------|---------|--------|---------|\n");

        for name in files {
            let old = FileStats::from(report.old.file(name));
            let new = FileStats::from(report.new.file(name));

            let (emoji, diff) = emoji_score(new.percent, old.percent);
            writeln!(
                md,
                "| {name} | {:.2}% ({diff}) | {} | {} | {} | {emoji} |",
                new.percent,
                value_with_delta(old.total, new.total),
                value_with_delta(old.covered, new.covered),
                value_with_delta(old.missed, new.missed),
            )?;
        }

        md.push('\n');
        md.push_str(
            "_Please note that the \"Total\", \"Covered\", and \"Missed\" counts above refer to \
             ***code statements*** instead of lines of code. The value in brackets refers to the \
             test coverage of that file in the old version of the code._\n",
        );
        md.push('\n');
        Ok(())
    }
}

/// JSON formatter, for machine consumption.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        report.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
