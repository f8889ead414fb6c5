/// Output formats for the coverage delta report.
use crate::error::CovdeltaError;
use crate::report::{JsonFormatter, MarkdownFormatter, ReportFormatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }

    /// The formatter that renders reports in this format.
    pub fn formatter(&self) -> &'static dyn ReportFormatter {
        match self {
            OutputFormat::Markdown => &MarkdownFormatter,
            OutputFormat::Json => &JsonFormatter,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = CovdeltaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(CovdeltaError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
