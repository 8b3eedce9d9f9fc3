//! A simulated translator + allocator that drives `memtrace-ir`'s
//! instrumentation pass and `memtrace-core`'s runtime end-to-end,
//! standing in for the real guest process the core is normally embedded
//! in. Used by the `demo` subcommand and by `replay`.

use memtrace_core::{AllocationContext, Config, ContextHandle, Sink, ToolState};
use memtrace_ir::{instrument, BasicBlock, GateConfig, GuestExtents, IrExpr, Segment, Stmt, StoreType, TempId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Label(String);

impl Label {
    pub fn new(s: impl Into<String>) -> Self {
        Label(s.into())
    }
}

impl AllocationContext for Label {
    fn describe(&self) -> String {
        if self.0.is_empty() {
            "(No allocation stack trace available)".to_string()
        } else {
            self.0.clone()
        }
    }
}

fn app_extents() -> GuestExtents {
    GuestExtents::new(vec![Segment {
        addr: 0x400000,
        backing_path: Some("/home/user/app".into()),
    }])
}

/// Runs one store through the real `instrument()` pass to determine the
/// number and byte-offset order of the Dirty calls it emits for `ty`,
/// then executes each one against `state` with the caller-supplied
/// chunk value — most-significant chunk first, matching
/// `chunk_values`'s order.
fn store_chunks(ty: StoreType, extents: &GuestExtents, gate: &GateConfig) -> Vec<u64> {
    let block = BasicBlock::new(vec![
        Stmt::WrTmp(0, IrExpr::Const(0)),
        Stmt::WrTmp(1, IrExpr::Const(0)),
        Stmt::Store { addr: IrExpr::Temp(0), data: IrExpr::Temp(1), ty },
    ]);
    let out = instrument(block, extents, gate);

    let mut addr_exprs: HashMap<TempId, &IrExpr> = HashMap::new();
    for stmt in &out.stmts {
        if let Stmt::WrTmp(t, expr) = stmt {
            addr_exprs.insert(*t, expr);
        }
    }

    out.stmts
        .iter()
        .filter_map(|s| match s {
            Stmt::DirtyOnStore { addr_tmp, .. } => match addr_exprs.get(addr_tmp) {
                Some(IrExpr::Temp(_)) => Some(0),
                Some(IrExpr::AddOffset(_, off)) => Some(*off),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

pub struct Harness {
    state: ToolState,
    extents: GuestExtents,
    gate: GateConfig,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        Self {
            state: ToolState::init(config),
            extents: app_extents(),
            gate: GateConfig::default(),
        }
    }

    /// Replace the guest extents the IR pass gates against, e.g. with
    /// one resolved from a real process's `/proc/pid/maps`.
    pub fn set_extents(&mut self, extents: GuestExtents) {
        self.extents = extents;
    }

    pub fn alloc(&mut self, sink: &mut dyn Sink, start: u64, size: u64, label: &str) -> memtrace_core::Result<()> {
        self.state.on_new_block(sink, start, size, ContextHandle::new(Label::new(label)))
    }

    pub fn free(&mut self, sink: &mut dyn Sink, start: u64, size: u64, label: &str) -> memtrace_core::Result<()> {
        self.state.on_free_block(sink, start, size, ContextHandle::new(Label::new(label)))
    }

    /// Runs `ty`'s store through the instrumentation pass and then
    /// executes the resulting Dirty calls with `chunk_values` (one per
    /// emitted call, most-significant first). Panics if the caller
    /// supplies the wrong number of values for `ty`'s lowering.
    pub fn store(&mut self, sink: &mut dyn Sink, addr: u64, ty: StoreType, chunk_values: &[u64]) -> memtrace_core::Result<()> {
        let offsets = store_chunks(ty, &self.extents, &self.gate);
        assert_eq!(
            offsets.len(),
            chunk_values.len(),
            "{:?} lowers to {} callback(s), got {} chunk value(s)",
            ty,
            offsets.len(),
            chunk_values.len()
        );
        for (offset, value) in offsets.into_iter().zip(chunk_values) {
            self.state.on_store(sink, addr + offset, *value)?;
        }
        Ok(())
    }

    pub fn tracked_block_count(&self) -> usize {
        self.state.tracked_block_count()
    }

    pub fn shutdown(self, sink: &mut dyn Sink) -> memtrace_core::Result<()> {
        self.state.fini(sink)
    }
}

/// The built-in end-to-end scenarios, selectable from the `demo`
/// subcommand.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Scenario {
    ScalarInRange,
    BelowThreshold,
    OutOfRangePredecessor,
    Vector128,
    Vector256,
    FreeOrdering,
    BufferWrap,
}

pub fn run_scenario(scenario: Scenario, sink: &mut dyn Sink) -> memtrace_core::Result<()> {
    match scenario {
        Scenario::ScalarInRange => {
            let mut h = Harness::new(Config { min_block_size: 4096, max_log_entries: 16 });
            h.alloc(sink, 0x1000, 0x2000, "ctxA")?;
            h.store(sink, 0x1500, StoreType::I64, &[0xdeadbeef_deadbeef])?;
            h.shutdown(sink)
        }
        Scenario::BelowThreshold => {
            let mut h = Harness::new(Config { min_block_size: 4096, max_log_entries: 16 });
            h.alloc(sink, 0x1000, 0x100, "ctxB")?;
            h.store(sink, 0x1010, StoreType::I64, &[1])?;
            h.shutdown(sink)
        }
        Scenario::OutOfRangePredecessor => {
            let mut h = Harness::new(Config { min_block_size: 4096, max_log_entries: 16 });
            h.alloc(sink, 0x1000, 0x2000, "ctxA")?;
            h.store(sink, 0x3000, StoreType::I64, &[1])?;
            h.shutdown(sink)
        }
        Scenario::Vector128 => {
            let mut h = Harness::new(Config { min_block_size: 4096, max_log_entries: 16 });
            h.alloc(sink, 0x1000, 0x2000, "ctxA")?;
            h.store(sink, 0x1500, StoreType::V128, &[0xaaaaaaaa_aaaaaaaa, 0xbbbbbbbb_bbbbbbbb])?;
            h.shutdown(sink)
        }
        Scenario::Vector256 => {
            let mut h = Harness::new(Config { min_block_size: 4096, max_log_entries: 16 });
            h.alloc(sink, 0x1000, 0x2000, "ctxA")?;
            h.store(sink, 0x2000, StoreType::V256, &[0xaaaa, 0xbbbb, 0xcccc, 0xdddd])?;
            h.shutdown(sink)
        }
        Scenario::FreeOrdering => {
            let mut h = Harness::new(Config { min_block_size: 4096, max_log_entries: 16 });
            h.alloc(sink, 0x1000, 0x2000, "ctxA")?;
            h.store(sink, 0x1500, StoreType::I64, &[1])?;
            h.free(sink, 0x1000, 0x2000, "ctxA")?;
            h.store(sink, 0x1500, StoreType::I64, &[2])?;
            h.shutdown(sink)
        }
        Scenario::BufferWrap => {
            let capacity = 4;
            let mut h = Harness::new(Config { min_block_size: 4096, max_log_entries: capacity });
            h.alloc(sink, 0x1000, 0x2000, "ctxA")?;
            for i in 0..(capacity as u64 + 1) {
                h.store(sink, 0x1500 + i, StoreType::I64, &[i])?;
            }
            h.shutdown(sink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtrace_core::Sink as _;

    #[derive(Default)]
    struct CountingSink {
        stores: usize,
        allocs: usize,
        frees: usize,
    }

    impl Sink for CountingSink {
        fn write_store(&mut self, _addr: u64, _value: u64) -> Result<(), ()> {
            self.stores += 1;
            Ok(())
        }
        fn write_alloc(&mut self, _start: u64, _size: u64, _context: &str) -> Result<(), ()> {
            self.allocs += 1;
            Ok(())
        }
        fn write_free(&mut self, _start: u64, _size: u64, _context: &str) -> Result<(), ()> {
            self.frees += 1;
            Ok(())
        }
    }

    #[test]
    fn vector256_scenario_emits_four_store_lines() {
        let mut sink = CountingSink::default();
        run_scenario(Scenario::Vector256, &mut sink).unwrap();
        assert_eq!(sink.stores, 4);
        assert_eq!(sink.allocs, 1);
    }

    #[test]
    fn free_ordering_scenario_drops_the_second_store() {
        let mut sink = CountingSink::default();
        run_scenario(Scenario::FreeOrdering, &mut sink).unwrap();
        assert_eq!(sink.stores, 1);
        assert_eq!(sink.frees, 1);
    }

    #[test]
    fn below_threshold_scenario_produces_no_alloc_or_store() {
        let mut sink = CountingSink::default();
        run_scenario(Scenario::BelowThreshold, &mut sink).unwrap();
        assert_eq!(sink.stores, 0);
        assert_eq!(sink.allocs, 0);
    }
}
