//! The "is this application code?" gate: loop over every one of the
//! block's guest extents, find each address's containing segment, and
//! treat the block as application code if *any* such segment's backing
//! path does **not** start with one of the configured system-library
//! prefixes.
//!
//! This gate is advisory, not a security boundary.

/// One of a block's guest addresses, resolved to its backing file path
/// (or `None` if unmapped/anonymous). In production the translator
/// supplies this; `memtrace-cli`'s demo harness derives it from
/// `/proc/pid/maps`.
#[derive(Debug, Clone)]
pub struct Segment {
    pub addr: u64,
    pub backing_path: Option<String>,
}

/// The guest extents handed to `instrument()` for one basic block.
#[derive(Debug, Clone, Default)]
pub struct GuestExtents {
    segments: Vec<Segment>,
}

impl GuestExtents {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

/// The configurable system-library prefix list the gate checks
/// segment paths against.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub system_prefixes: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            system_prefixes: vec!["/usr".to_string()],
        }
    }
}

/// True if at least one of `extents`'s segments is *not* backed by a
/// system-library path, i.e. the block looks like application code.
pub fn is_app_code(extents: &GuestExtents, gate: &GateConfig) -> bool {
    extents.segments.iter().any(|seg| match &seg.backing_path {
        Some(path) => !gate
            .system_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str())),
        None => true,
    })
}
