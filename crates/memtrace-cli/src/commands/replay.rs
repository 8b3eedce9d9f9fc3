//! `replay`: drives the harness from a small text script instead of a
//! built-in scenario, so arbitrary alloc/free/store sequences can be
//! exercised without recompiling.
//!
//! Script grammar, one command per line, blank lines and `#` comments
//! ignored:
//!
//! ```text
//! alloc <start_hex> <size_dec> <label>
//! free  <start_hex> <size_dec> <label>
//! store <addr_hex> <value_hex>
//! store128 <addr_hex> <hi_hex> <lo_hex>
//! store256 <addr_hex> <l3_hex> <l2_hex> <l1_hex> <l0_hex>
//! ```

use crate::error::{Error, Result};
use crate::harness::Harness;
use crate::segments::MemoryMaps;
use crate::sink::TextSink;
use memtrace_core::Config;
use memtrace_ir::StoreType;
use std::fs::{self, File};
use std::io;
use std::path::Path;

fn parse_hex(line: usize, s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| Error::TraceFormat { line, reason: e.to_string() })
}

fn parse_dec(line: usize, s: &str) -> Result<u64> {
    s.parse().map_err(|_| Error::TraceFormat { line, reason: format!("not a decimal integer: {s}") })
}

pub fn run(script: &Path, pid: Option<u32>, min_block_size: u64, output: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(script)?;
    let mut harness = Harness::new(Config { min_block_size, max_log_entries: 1_000_000 });

    if let Some(pid) = pid {
        // Resolve against a live process's address space instead of the
        // harness's default synthetic one.
        let maps = MemoryMaps::for_pid(pid)?;
        harness.set_extents(maps.guest_extents_for(0));
    }

    match output {
        Some(path) => {
            let mut sink = TextSink::new(File::create(path)?);
            run_script(&content, &mut harness, &mut sink)?;
        }
        None => {
            let mut sink = TextSink::new(io::stdout().lock());
            run_script(&content, &mut harness, &mut sink)?;
        }
    }
    Ok(())
}

fn run_script(content: &str, harness: &mut Harness, sink: &mut dyn memtrace_core::Sink) -> Result<()> {
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["alloc", start, size, label] => {
                harness.alloc(sink, parse_hex(line_no, start)?, parse_dec(line_no, size)?, label)?;
            }
            ["free", start, size, label] => {
                harness.free(sink, parse_hex(line_no, start)?, parse_dec(line_no, size)?, label)?;
            }
            ["store", addr, value] => {
                harness.store(sink, parse_hex(line_no, addr)?, StoreType::I64, &[parse_hex(line_no, value)?])?;
            }
            ["store128", addr, hi, lo] => {
                harness.store(
                    sink,
                    parse_hex(line_no, addr)?,
                    StoreType::V128,
                    &[parse_hex(line_no, hi)?, parse_hex(line_no, lo)?],
                )?;
            }
            ["store256", addr, l3, l2, l1, l0] => {
                harness.store(
                    sink,
                    parse_hex(line_no, addr)?,
                    StoreType::V256,
                    &[
                        parse_hex(line_no, l3)?,
                        parse_hex(line_no, l2)?,
                        parse_hex(line_no, l1)?,
                        parse_hex(line_no, l0)?,
                    ],
                )?;
            }
            _ => {
                return Err(Error::TraceFormat {
                    line: line_no,
                    reason: format!("unrecognized command: {line}"),
                });
            }
        }
    }
    Ok(())
}
