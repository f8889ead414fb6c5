//! In-memory representation of a statement coverage profile. The parser
//! produces one `Profile` per source file, which a `Coverage` snapshot then
//! aggregates.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Compute a coverage percentage (0–100), returning 0.0 when the total is zero.
#[must_use]
pub fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// Instrumentation mode recorded in the profile header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Set,
    Count,
    Atomic,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Set => "set",
            Mode::Count => "count",
            Mode::Atomic => "atomic",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(Mode::Set),
            "count" => Ok(Mode::Count),
            "atomic" => Ok(Mode::Atomic),
            _ => Err(format!("unknown mode {s:?}, expected set, count or atomic")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single instrumented statement region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub num_stmt: u32,
    pub count: u64,
}

impl Block {
    /// A block counts as covered once it was executed at least once.
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.count > 0
    }
}

/// All blocks of one source file, with statement totals computed on
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    pub file_name: String,
    pub mode: Mode,
    pub blocks: Vec<Block>,
    pub total_stmt: u64,
    pub covered_stmt: u64,
    pub missed_stmt: u64,
}

impl Profile {
    pub fn new(file_name: String, mode: Mode, blocks: Vec<Block>) -> Self {
        let mut total_stmt = 0;
        let mut covered_stmt = 0;
        for block in &blocks {
            total_stmt += u64::from(block.num_stmt);
            if block.is_covered() {
                covered_stmt += u64::from(block.num_stmt);
            }
        }

        Self {
            file_name,
            mode,
            blocks,
            total_stmt,
            covered_stmt,
            missed_stmt: total_stmt - covered_stmt,
        }
    }

    #[must_use]
    pub fn coverage_percent(&self) -> f64 {
        percent(self.covered_stmt, self.total_stmt)
    }
}

/// Statement counts of a file that may be missing from a snapshot. A missing
/// file reads as zero everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FileStats {
    pub total: u64,
    pub covered: u64,
    pub missed: u64,
    pub percent: f64,
}

impl From<Option<&Profile>> for FileStats {
    fn from(profile: Option<&Profile>) -> Self {
        match profile {
            Some(p) => FileStats {
                total: p.total_stmt,
                covered: p.covered_stmt,
                missed: p.missed_stmt,
                percent: p.coverage_percent(),
            },
            None => FileStats::default(),
        }
    }
}
