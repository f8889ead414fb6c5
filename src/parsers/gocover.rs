/// Parser for Go's `-coverprofile` format.
///
/// Reference: https://go.dev/blog/cover
///
/// Format:
///   mode: set|count|atomic
///   <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
///
/// Each line describes a basic block with the number of statements in the
/// block and how many times it was executed. Blocks are kept exactly as they
/// appear, grouped per file in order of first appearance, so that statement
/// counts can be aggregated later.
use std::collections::HashMap;
use std::io::BufRead;

use super::Parser;
use crate::error::{CovdeltaError, Result};
use crate::model::{Block, Mode, Profile};

/// Go coverage profile parser.
pub struct GocoverParser;

impl Parser for GocoverParser {
    fn parse(&self, input: &[u8]) -> Result<Vec<Profile>> {
        parse(input)
    }
}

/// Parse a Go coverage profile from raw bytes.
pub fn parse(input: &[u8]) -> Result<Vec<Profile>> {
    parse_reader(&mut &*input)
}

/// Parse a Go coverage profile line by line from a buffered reader.
pub fn parse_reader(reader: &mut dyn BufRead) -> Result<Vec<Profile>> {
    let mut mode: Option<Mode> = None;

    // Blocks grouped by file path, preserving insertion order.
    let mut file_order: Vec<String> = Vec::new();
    let mut file_blocks: HashMap<String, Vec<Block>> = HashMap::new();

    let mut raw_line = Vec::new();
    let mut line_number = 0;
    loop {
        raw_line.clear();
        let n = reader.read_until(b'\n', &mut raw_line)?;
        if n == 0 {
            break;
        }
        line_number += 1;

        let Ok(text) = std::str::from_utf8(&raw_line) else {
            let lossy = String::from_utf8_lossy(&raw_line);
            return Err(CovdeltaError::parse(line_number, lossy.trim(), "invalid UTF-8"));
        };

        let line = text.trim();
        if line.is_empty() {
            continue;
        }

        let Some(current_mode) = mode else {
            let parsed = parse_mode_line(line)
                .map_err(|msg| CovdeltaError::parse(line_number, line, msg))?;
            mode = Some(parsed);
            continue;
        };

        // Concatenated per-package profiles repeat the header.
        if line.starts_with("mode:") {
            let repeated = parse_mode_line(line)
                .map_err(|msg| CovdeltaError::parse(line_number, line, msg))?;
            if repeated != current_mode {
                return Err(CovdeltaError::parse(
                    line_number,
                    line,
                    format!("mode {repeated} conflicts with mode {current_mode}"),
                ));
            }
            continue;
        }

        let (file, block) = parse_block_line(line)
            .map_err(|msg| CovdeltaError::parse(line_number, line, msg))?;

        match file_blocks.get_mut(file) {
            Some(blocks) => blocks.push(block),
            None => {
                file_order.push(file.to_string());
                file_blocks.insert(file.to_string(), vec![block]);
            }
        }
    }

    let mode = mode.ok_or(CovdeltaError::EmptyProfile)?;

    Ok(file_order
        .into_iter()
        .filter_map(|file| {
            let blocks = file_blocks.remove(&file)?;
            Some(Profile::new(file, mode, blocks))
        })
        .collect())
}

/// Parse the `mode: <set|count|atomic>` header.
fn parse_mode_line(line: &str) -> std::result::Result<Mode, String> {
    let value = line
        .strip_prefix("mode:")
        .ok_or_else(|| "expected `mode: <set|count|atomic>`".to_string())?;
    value.trim().parse()
}

/// Parse a single block line, returning (file_path, Block).
///
/// Format: `<file>:<startLine>.<startCol>,<endLine>.<endCol> <numStmt> <count>`
fn parse_block_line(line: &str) -> std::result::Result<(&str, Block), String> {
    const SHAPE: &str = "expected `<file>:<startLine>.<startCol>,<endLine>.<endCol> <numStmt> <count>`";

    // The last two fields are always integers, so split from the right.
    let mut fields = line.rsplitn(3, ' ');
    let count = fields.next().ok_or(SHAPE)?;
    let num_stmt = fields.next().ok_or(SHAPE)?;
    let location = fields.next().ok_or(SHAPE)?.trim_end();

    // Anchor on the last ':' so paths containing colons survive.
    let (file, range) = location.rsplit_once(':').ok_or(SHAPE)?;
    if file.is_empty() {
        return Err("missing file name".to_string());
    }

    let (start, end) = range.split_once(',').ok_or(SHAPE)?;
    let (start_line, start_col) = parse_position(start)?;
    let (end_line, end_col) = parse_position(end)?;

    let num_stmt: u32 = num_stmt
        .parse()
        .map_err(|_| format!("invalid statement count {num_stmt:?}"))?;
    if num_stmt == 0 {
        return Err("statement count must be at least 1".to_string());
    }
    let count: u64 = count
        .parse()
        .map_err(|_| format!("invalid hit count {count:?}"))?;

    Ok((
        file,
        Block {
            start_line,
            start_col,
            end_line,
            end_col,
            num_stmt,
            count,
        },
    ))
}

/// Parse a `<line>.<column>` position.
fn parse_position(pos: &str) -> std::result::Result<(u32, u32), String> {
    let invalid = || format!("invalid position {pos:?}");
    let (line, col) = pos.split_once('.').ok_or_else(invalid)?;
    let line = line.parse().map_err(|_| invalid())?;
    let col = col.parse().map_err(|_| invalid())?;
    Ok((line, col))
}
