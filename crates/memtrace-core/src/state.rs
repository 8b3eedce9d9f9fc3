use crate::block::ContextHandle;
use crate::callback;
use crate::error::Result;
use crate::index::BlockIndex;
use crate::lifecycle;
use crate::log::LogBuffer;
use crate::sink::Sink;

/// The tool's two tunables, both fixed at init time.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Default one page.
    pub min_block_size: u64,
    /// Log-buffer capacity. Production deployments size this in the
    /// millions of entries; the exact value is a tuning knob, not a
    /// contract.
    pub max_log_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_block_size: 4096,
            max_log_entries: 3_000_000,
        }
    }
}

/// The single tool-state object constructed at init and threaded into
/// every callback.
///
/// `ToolState` owns the interval index and the log buffer; it does not
/// own the sink, since the sink is the host's write endpoint and its
/// lifetime is the host's concern. Every method takes `&mut self`, so
/// the borrow checker enforces that the core holds no locks of its own
/// and the host must serialize calls — there is no way to call two
/// callbacks concurrently without `unsafe` aliasing.
pub struct ToolState {
    index: BlockIndex,
    log: LogBuffer,
    config: Config,
}

impl ToolState {
    /// `init()`: prepares the index (empty) and the buffer (empty,
    /// preallocated to `config.max_log_entries`).
    pub fn init(config: Config) -> Self {
        Self {
            index: BlockIndex::new(),
            log: LogBuffer::new(config.max_log_entries),
            config,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn tracked_block_count(&self) -> usize {
        self.index.len()
    }

    /// Component C: the store callback.
    pub fn on_store(&mut self, sink: &mut dyn Sink, addr: u64, value: u64) -> Result<()> {
        callback::on_store(
            &self.index,
            &mut self.log,
            sink,
            self.config.min_block_size,
            addr,
            value,
        )
    }

    /// Component E: allocation notification.
    pub fn on_new_block(
        &mut self,
        sink: &mut dyn Sink,
        start: u64,
        size: u64,
        context: ContextHandle,
    ) -> Result<()> {
        lifecycle::on_new_block(
            &mut self.index,
            &mut self.log,
            sink,
            self.config.min_block_size,
            start,
            size,
            context,
        )
    }

    /// Component E: free notification.
    pub fn on_free_block(
        &mut self,
        sink: &mut dyn Sink,
        start: u64,
        size: u64,
        context: ContextHandle,
    ) -> Result<()> {
        lifecycle::on_free_block(
            &mut self.index,
            &mut self.log,
            sink,
            self.config.min_block_size,
            start,
            size,
            context,
        )
    }

    /// `fini()`: flushes the buffer, then drops the index. No
    /// synthetic `Free` events are emitted for blocks still live.
    pub fn fini(mut self, sink: &mut dyn Sink) -> Result<()> {
        self.log.shutdown_flush(sink)?;
        self.index.drop_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AllocationContext;
    use crate::sink::tests::RecordingSink;
    use alloc::string::String;

    #[derive(Debug, Clone)]
    struct Ctx(&'static str);
    impl AllocationContext for Ctx {
        fn describe(&self) -> String {
            String::from(self.0)
        }
    }

    #[test]
    fn end_to_end_scalar_scenario() {
        let mut state = ToolState::init(Config {
            min_block_size: 4096,
            max_log_entries: 16,
        });
        let mut sink = RecordingSink::default();

        state
            .on_new_block(&mut sink, 0x1000, 0x2000, ContextHandle::new(Ctx("ctxA")))
            .unwrap();
        state
            .on_store(&mut sink, 0x1500, 0xdeadbeef_deadbeef)
            .unwrap();
        state.fini(&mut sink).unwrap();

        assert_eq!(sink.allocs.len(), 1);
        assert_eq!(sink.stores, [(0x1500, 0xdeadbeef_deadbeef)]);
    }

    #[test]
    fn shutdown_drops_all_tracked_blocks_without_synthetic_frees() {
        let mut state = ToolState::init(Config::default());
        let mut sink = RecordingSink::default();
        state
            .on_new_block(&mut sink, 0x1000, 0x2000, ContextHandle::new(Ctx("ctxA")))
            .unwrap();
        assert_eq!(state.tracked_block_count(), 1);
        state.fini(&mut sink).unwrap();
        assert!(sink.frees.is_empty());
    }
}
