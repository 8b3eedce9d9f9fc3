//! `/proc/[pid]/maps` parsing, trimmed to the fields the IR pass's gate
//! needs: an address range and the backing file path, if any.

use crate::error::Result;
use std::fs;

#[derive(Debug, Clone)]
pub struct MemoryMapping {
    pub start: u64,
    pub end: u64,
    pub pathname: Option<String>,
}

impl MemoryMapping {
    pub fn contains(&self, addr: u64) -> bool {
        self.start <= addr && addr < self.end
    }
}

pub struct MemoryMaps {
    mappings: Vec<MemoryMapping>,
}

impl MemoryMaps {
    pub fn for_pid(pid: u32) -> Result<Self> {
        let path = format!("/proc/{}/maps", pid);
        let content = fs::read_to_string(&path)?;
        let mappings = content.lines().filter_map(Self::parse_line).collect();
        Ok(MemoryMaps { mappings })
    }

    fn parse_line(line: &str) -> Option<MemoryMapping> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return None;
        }
        let addr_parts: Vec<&str> = parts[0].split('-').collect();
        if addr_parts.len() != 2 {
            return None;
        }
        let start = u64::from_str_radix(addr_parts[0], 16).ok()?;
        let end = u64::from_str_radix(addr_parts[1], 16).ok()?;
        let pathname = if parts.len() >= 6 {
            Some(parts[5..].join(" "))
        } else {
            None
        };
        Some(MemoryMapping { start, end, pathname })
    }

    /// The mapping containing `addr`, if any.
    pub fn find(&self, addr: u64) -> Option<&MemoryMapping> {
        self.mappings.iter().find(|m| m.contains(addr))
    }

    /// Resolves `addr` against this process's real mappings and wraps
    /// the result as a single-segment [`memtrace_ir::GuestExtents`],
    /// for gating a replayed trace against a live process's address
    /// space instead of the demo harness's synthetic one.
    pub fn guest_extents_for(&self, addr: u64) -> memtrace_ir::GuestExtents {
        let backing_path = self.find(addr).and_then(|m| m.pathname.clone());
        memtrace_ir::GuestExtents::new(vec![memtrace_ir::Segment { addr, backing_path }])
    }
}
