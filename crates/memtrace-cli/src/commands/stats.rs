//! `stats`: reads back a trace previously written in `TextSink`'s line
//! format and summarizes it — this tool's sink is line-oriented text,
//! not a queryable database, so "read it back" means re-parsing that
//! same format rather than a SQL query.

use crate::error::{Error, Result};
use comfy_table::Table;
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct Stats {
    pub store_count: u64,
    pub alloc_count: u64,
    pub free_count: u64,
    pub total_alloc_bytes: u128,
    pub total_free_bytes: u128,
}

fn parse_start_size(line_no: usize, line: &str) -> Result<(u64, u64)> {
    let rest = line
        .strip_prefix("Start 0x")
        .ok_or_else(|| Error::TraceFormat { line: line_no, reason: "expected a Start line".into() })?;
    let (start_hex, tail) = rest
        .split_once(", size ")
        .ok_or_else(|| Error::TraceFormat { line: line_no, reason: "malformed Start line".into() })?;
    let start = u64::from_str_radix(start_hex, 16)
        .map_err(|e| Error::TraceFormat { line: line_no, reason: e.to_string() })?;
    let size = tail
        .trim()
        .parse()
        .map_err(|_| Error::TraceFormat { line: line_no, reason: format!("not a decimal size: {tail}") })?;
    Ok((start, size))
}

pub fn parse(content: &str) -> Result<Stats> {
    let mut stats = Stats::default();
    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() {
            i += 1;
            continue;
        }
        if line == "===ALLOC START===" || line == "===FREE START===" {
            let is_alloc = line == "===ALLOC START===";
            let end_marker = if is_alloc { "===ALLOC END===" } else { "===FREE END===" };
            let (_, size) = parse_start_size(i + 2, lines.get(i + 1).copied().unwrap_or(""))?;
            let mut j = i + 2;
            while j < lines.len() && lines[j] != end_marker {
                j += 1;
            }
            if j == lines.len() {
                return Err(Error::TraceFormat { line: i + 1, reason: format!("missing {end_marker}") });
            }
            if is_alloc {
                stats.alloc_count += 1;
                stats.total_alloc_bytes += size as u128;
            } else {
                stats.free_count += 1;
                stats.total_free_bytes += size as u128;
            }
            i = j + 1;
        } else if let Some((addr, value)) = line.split_once(' ') {
            if addr.starts_with("0x") && value.starts_with("0x") {
                stats.store_count += 1;
                i += 1;
            } else {
                return Err(Error::TraceFormat { line: i + 1, reason: format!("unrecognized line: {line}") });
            }
        } else {
            return Err(Error::TraceFormat { line: i + 1, reason: format!("unrecognized line: {line}") });
        }
    }
    Ok(stats)
}

pub fn run(trace: &Path) -> Result<()> {
    let content = fs::read_to_string(trace)?;
    let stats = parse(&content)?;

    let mut table = Table::new();
    table.set_header(vec!["metric", "value"]);
    table.add_row(vec!["stores".to_string(), stats.store_count.to_string()]);
    table.add_row(vec!["allocs".to_string(), stats.alloc_count.to_string()]);
    table.add_row(vec!["frees".to_string(), stats.free_count.to_string()]);
    table.add_row(vec!["bytes allocated".to_string(), stats.total_alloc_bytes.to_string()]);
    table.add_row(vec!["bytes freed".to_string(), stats.total_free_bytes.to_string()]);

    println!("{table}");
    Ok(())
}
