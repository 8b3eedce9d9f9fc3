use crate::block::{Block, ContextHandle, Event};
use crate::error::Result;
use crate::index::BlockIndex;
use crate::log::LogBuffer;
use crate::sink::Sink;

/// `on_new_block`: below `min_block_size`, ignored. Otherwise append
/// `Alloc{start,size,where}` then insert into the index. The threshold
/// filter runs before either side effect so a sub-threshold allocation
/// leaves no trace at all.
pub fn on_new_block(
    index: &mut BlockIndex,
    log: &mut LogBuffer,
    sink: &mut dyn Sink,
    min_block_size: u64,
    start: u64,
    size: u64,
    context: ContextHandle,
) -> Result<()> {
    if size < min_block_size {
        return Ok(());
    }
    log.append(
        Event::Alloc {
            start,
            size,
            context: context.clone(),
        },
        sink,
    )?;
    index.insert(Block {
        start,
        size,
        context,
    });
    Ok(())
}

/// `on_free_block`: symmetric to `on_new_block`.
pub fn on_free_block(
    index: &mut BlockIndex,
    log: &mut LogBuffer,
    sink: &mut dyn Sink,
    min_block_size: u64,
    start: u64,
    size: u64,
    context: ContextHandle,
) -> Result<()> {
    if size < min_block_size {
        return Ok(());
    }
    log.append(
        Event::Free {
            start,
            size,
            context,
        },
        sink,
    )?;
    index.delete(start);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AllocationContext;
    use crate::callback::on_store;
    use crate::sink::tests::RecordingSink;
    use alloc::string::String;

    #[derive(Debug, Clone)]
    struct Ctx(&'static str);
    impl AllocationContext for Ctx {
        fn describe(&self) -> String {
            String::from(self.0)
        }
    }

    const MIN: u64 = 4096;

    #[test]
    fn below_threshold_alloc_is_ignored() {
        let mut index = BlockIndex::new();
        let mut log = LogBuffer::new(8);
        let mut sink = RecordingSink::default();
        on_new_block(
            &mut index,
            &mut log,
            &mut sink,
            MIN,
            0x1000,
            0x100,
            ContextHandle::new(Ctx("b")),
        )
        .unwrap();
        log.shutdown_flush(&mut sink).unwrap();
        assert!(sink.allocs.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn a_store_after_free_produces_no_line() {
        let mut index = BlockIndex::new();
        let mut log = LogBuffer::new(8);
        let mut sink = RecordingSink::default();

        on_new_block(
            &mut index,
            &mut log,
            &mut sink,
            MIN,
            0x1000,
            0x2000,
            ContextHandle::new(Ctx("a")),
        )
        .unwrap();
        on_store(&index, &mut log, &mut sink, MIN, 0x1500, 1).unwrap();
        on_free_block(
            &mut index,
            &mut log,
            &mut sink,
            MIN,
            0x1000,
            0x2000,
            ContextHandle::new(Ctx("a")),
        )
        .unwrap();
        // Second store, after the free, must produce no line.
        on_store(&index, &mut log, &mut sink, MIN, 0x1500, 2).unwrap();
        log.shutdown_flush(&mut sink).unwrap();

        assert_eq!(sink.allocs.len(), 1);
        assert_eq!(sink.stores, [(0x1500, 1)]);
        assert_eq!(sink.frees.len(), 1);
    }

    #[test]
    fn duplicate_free_of_unknown_start_is_silent() {
        let mut index = BlockIndex::new();
        let mut log = LogBuffer::new(8);
        let mut sink = RecordingSink::default();
        on_free_block(
            &mut index,
            &mut log,
            &mut sink,
            MIN,
            0xabc,
            0x2000,
            ContextHandle::new(Ctx("a")),
        )
        .unwrap();
        // on_free_block still logs the Free event (the sink doesn't
        // validate liveness); the index delete is just a no-op.
        log.shutdown_flush(&mut sink).unwrap();
        assert!(index.is_empty());
    }
}
