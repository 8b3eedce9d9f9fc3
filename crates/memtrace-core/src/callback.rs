use crate::block::Event;
use crate::error::Result;
use crate::index::BlockIndex;
use crate::log::LogBuffer;
use crate::sink::Sink;

/// Store-callback runtime: `on_store(addr, value64)`.
///
/// 1. `p := predecessor(addr)` in the index.
/// 2. If `p` exists, `addr < p.start + p.size`, and `p.size >=
///    min_block_size`, append `Store{addr, value64}`. Else return.
///
/// Allocation-free: `find_containing` only walks the `BTreeMap`, never
/// inserts. The `min_block_size` re-check is redundant with the
/// lifecycle sink's own filter today, but guards against a future
/// caller that inserts blocks some other way.
#[inline]
pub fn on_store(
    index: &BlockIndex,
    log: &mut LogBuffer,
    sink: &mut dyn Sink,
    min_block_size: u64,
    addr: u64,
    value: u64,
) -> Result<()> {
    match index.find_containing(addr) {
        Some(block) if block.size >= min_block_size => {
            log.append(Event::Store { addr, value }, sink)
        }
        _ => Ok(()),
    }
}
