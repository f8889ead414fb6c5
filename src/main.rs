use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use covdelta::cli::{self, Config};
use covdelta::format::OutputFormat;

/// covdelta — Compare the coverage of changed files between two Go coverage profiles.
///
/// Parses OLD_COVERAGE_FILE and NEW_COVERAGE_FILE and compares the coverage of
/// the files listed in CHANGED_FILES_FILE. The result is printed to stdout as a
/// Markdown table with emojis indicating the coverage change per package.
///
/// Coverage profiles identify files by their full import path (e.g.
/// "github.com/user/example/foo/my_file.go"), so use --root to map changed
/// files such as "foo/my_file.go" onto them. Packages whose name differs from
/// their directory are not supported.
#[derive(Parser)]
#[command(name = "covdelta", version, about, long_about)]
struct Cli {
    /// Old coverage file, in the format produced by `go test -coverprofile`.
    #[arg(value_name = "OLD_COVERAGE_FILE")]
    old_coverage: PathBuf,

    /// New coverage file, in the same format as OLD_COVERAGE_FILE.
    #[arg(value_name = "NEW_COVERAGE_FILE")]
    new_coverage: PathBuf,

    /// JSON file containing the list of changed files as a string array.
    #[arg(value_name = "CHANGED_FILES_FILE")]
    changed_files: PathBuf,

    /// Import path of the tested repository, prefixed to every changed file.
    #[arg(long, default_value = "")]
    root: String,

    /// Path of the Go module within the repository, removed from every changed file.
    #[arg(long, default_value = "")]
    project_path: String,

    /// Prefix to trim from every path in the report.
    #[arg(long)]
    trim: Option<String>,

    /// Output format (markdown, json).
    #[arg(long, default_value = "markdown")]
    format: String,

    /// Ignore files matching this regular expression in both profiles.
    #[arg(long)]
    exclude: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let format: OutputFormat = cli.format.parse()?;
    let mut config = Config {
        root: cli.root,
        project_path: cli.project_path,
        trim: cli.trim,
        format,
        exclude: None,
    };
    if let Some(pattern) = cli.exclude.as_deref() {
        config.set_exclude(pattern)?;
    }

    if let Some(output) = cli::cmd_report(
        &cli.old_coverage,
        &cli.new_coverage,
        &cli.changed_files,
        &config,
    )? {
        println!("{output}");
    }

    Ok(())
}
